use super::Direction;
use chrono::{DateTime, Utc};
use sqlx::Error as SqlxError;

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error(
        "Migration '{next}' is registered after '{previous}'; identifiers must be strictly ascending"
    )]
    UnorderedRegistry {
        previous: &'static str,
        next: &'static str,
    },

    #[error("Migration id '{id}' is not prefixed with a YYYYMMDDHHMMSS timestamp")]
    MalformedId { id: &'static str },

    #[error("Database ledger contains '{id}', which this binary does not know")]
    UnknownAppliedStep { id: String },

    #[error("Database ledger is out of order: found '{found}' where '{expected}' was expected")]
    LedgerOutOfOrder {
        found: String,
        expected: &'static str,
    },

    #[error("No migration registered with id '{id}'")]
    UnknownTarget { id: String },

    #[error("Migration lock held by '{holder}' since {since}; another run may be in progress")]
    InProgress { holder: String, since: DateTime<Utc> },

    #[error("Migration '{id}' failed while running {direction}: {source}")]
    StepFailed {
        id: &'static str,
        direction: Direction,
        #[source]
        source: SqlxError,
    },

    #[error("Migration '{id}' left table '{table}' referencing missing table '{references}'")]
    DanglingReference {
        id: &'static str,
        table: String,
        references: String,
    },

    #[error("Migration '{id}' left {count} row(s) in '{table}' violating foreign keys")]
    ForeignKeyViolation {
        id: &'static str,
        table: String,
        count: usize,
    },

    #[error("Database error: {0}")]
    Database(#[from] SqlxError),
}
