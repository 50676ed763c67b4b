use crate::migrate::MigrationError;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum StayError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("Migration error: {0}")]
    Migration(#[from] MigrationError),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("Property {property_id} has no active lock PIN")]
    NoActivePin { property_id: i64 },

    #[error("No active {template_type} template for property {property_id}")]
    NoActiveTemplate {
        property_id: i64,
        template_type: String,
    },
}

impl From<figment::Error> for StayError {
    fn from(e: figment::Error) -> Self {
        StayError::Config(Box::new(e))
    }
}

impl StayError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        StayError::NotFound { entity, id }
    }

    /// True when the underlying database rejected a UNIQUE or PRIMARY KEY constraint.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            StayError::DatabaseError(SqlxError::Database(db)) => db.is_unique_violation(),
            _ => false,
        }
    }
}
