//! Persisted record of applied steps and the single-run lock.

use super::{Migration, MigrationError};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection};

const LEDGER_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS _schema_migrations (
    id TEXT PRIMARY KEY NOT NULL,
    description TEXT NOT NULL,
    applied_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS _schema_migration_lock (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    holder TEXT NOT NULL,
    acquired_at TEXT NOT NULL
);
"#;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct AppliedMigration {
    pub id: String,
    pub description: String,
    pub applied_at: DateTime<Utc>,
}

pub(super) async fn ensure(conn: &mut SqliteConnection) -> Result<(), MigrationError> {
    for stmt in LEDGER_INIT.split(';') {
        let s = stmt.trim();
        if s.is_empty() {
            continue;
        }
        sqlx::query(s).execute(&mut *conn).await?;
    }
    Ok(())
}

pub(super) async fn applied(
    conn: &mut SqliteConnection,
) -> Result<Vec<AppliedMigration>, MigrationError> {
    let rows = sqlx::query_as::<_, AppliedMigration>(
        "SELECT id, description, applied_at FROM _schema_migrations ORDER BY id",
    )
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows)
}

pub(super) async fn record(
    conn: &mut SqliteConnection,
    step: &Migration,
    applied_at: DateTime<Utc>,
) -> Result<(), MigrationError> {
    sqlx::query("INSERT INTO _schema_migrations (id, description, applied_at) VALUES (?, ?, ?)")
        .bind(step.id)
        .bind(step.description)
        .bind(applied_at)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub(super) async fn remove(conn: &mut SqliteConnection, id: &str) -> Result<(), MigrationError> {
    sqlx::query("DELETE FROM _schema_migrations WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub(super) async fn acquire_lock(
    conn: &mut SqliteConnection,
    holder: &str,
) -> Result<(), MigrationError> {
    let inserted = sqlx::query(
        "INSERT INTO _schema_migration_lock (id, holder, acquired_at) VALUES (1, ?, ?)
         ON CONFLICT(id) DO NOTHING",
    )
    .bind(holder)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?
    .rows_affected();

    if inserted == 1 {
        return Ok(());
    }

    let (holder, since): (String, DateTime<Utc>) =
        sqlx::query_as("SELECT holder, acquired_at FROM _schema_migration_lock WHERE id = 1")
            .fetch_one(&mut *conn)
            .await?;
    Err(MigrationError::InProgress { holder, since })
}

pub(super) async fn release_lock(
    conn: &mut SqliteConnection,
    holder: &str,
) -> Result<(), MigrationError> {
    sqlx::query("DELETE FROM _schema_migration_lock WHERE id = 1 AND holder = ?")
        .bind(holder)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Drops the lock regardless of holder. Returns whether one was present.
pub(super) async fn clear_lock(conn: &mut SqliteConnection) -> Result<bool, MigrationError> {
    let cleared = sqlx::query("DELETE FROM _schema_migration_lock")
        .execute(&mut *conn)
        .await?
        .rows_affected();
    Ok(cleared > 0)
}
