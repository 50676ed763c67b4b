use super::ledger::{self, AppliedMigration};
use super::registry::{migrations, validate_registry};
use super::{
    Direction, Migration, MigrationError, MigrationReport, Revert, StepOutcome, StepReport,
    StepStatus,
};
use crate::db::SqlitePool;
use chrono::Utc;
use sqlx::{Connection, Row, SqliteConnection};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Applies and reverts the migration chain against one database.
///
/// A run holds one pooled connection from start to finish, disables foreign-key
/// enforcement on it for the duration and verifies references at the end of
/// every step before committing.
#[derive(Clone)]
pub struct Migrator {
    pool: SqlitePool,
    steps: Vec<Migration>,
    holder: String,
}

impl Migrator {
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_steps(pool, migrations())
    }

    /// Run against a custom chain instead of the bundled one.
    pub fn with_steps(pool: SqlitePool, steps: Vec<Migration>) -> Self {
        Self {
            pool,
            steps,
            holder: format!("stayops-{}", std::process::id()),
        }
    }

    pub fn with_lock_holder(mut self, holder: impl Into<String>) -> Self {
        self.holder = holder.into();
        self
    }

    pub fn steps(&self) -> &[Migration] {
        &self.steps
    }

    pub async fn applied(&self) -> Result<Vec<AppliedMigration>, MigrationError> {
        let mut conn = self.pool.acquire().await?;
        ledger::ensure(&mut conn).await?;
        ledger::applied(&mut conn).await
    }

    pub async fn status(&self) -> Result<Vec<StepStatus>, MigrationError> {
        validate_registry(&self.steps)?;
        let applied = self.applied().await?;
        self.check_ledger(&applied)?;

        Ok(self
            .steps
            .iter()
            .enumerate()
            .map(|(i, step)| StepStatus {
                id: step.id,
                description: step.description,
                reversible: step.is_reversible(),
                applied_at: applied.get(i).map(|a| a.applied_at),
            })
            .collect())
    }

    /// Apply pending steps in order, stopping after `target` when given.
    ///
    /// The plan is read from the ledger only once the run lock is held, so a
    /// run that lost the race to another finds the steps already applied.
    pub async fn up(&self, target: Option<&str>) -> Result<MigrationReport, MigrationError> {
        validate_registry(&self.steps)?;
        let end = match target {
            Some(id) => self.position(id)? + 1,
            None => self.steps.len(),
        };

        let mut conn = self.pool.acquire().await?;
        ledger::ensure(&mut conn).await?;
        ledger::acquire_lock(&mut conn, &self.holder).await?;
        let result = self.apply_pending(&mut conn, end).await;
        self.finish_run(&mut conn).await;
        result
    }

    /// Revert the most recently applied `count` steps, newest first.
    pub async fn down(&self, count: usize) -> Result<MigrationReport, MigrationError> {
        validate_registry(&self.steps)?;

        let mut conn = self.pool.acquire().await?;
        ledger::ensure(&mut conn).await?;
        ledger::acquire_lock(&mut conn, &self.holder).await?;
        let result = self.revert_latest(&mut conn, count).await;
        self.finish_run(&mut conn).await;
        result
    }

    /// Clear a lock left behind by a crashed run.
    pub async fn force_unlock(&self) -> Result<bool, MigrationError> {
        let mut conn = self.pool.acquire().await?;
        ledger::ensure(&mut conn).await?;
        let cleared = ledger::clear_lock(&mut conn).await?;
        if cleared {
            warn!("migration lock cleared manually");
        }
        Ok(cleared)
    }

    async fn apply_pending(
        &self,
        conn: &mut SqliteConnection,
        end: usize,
    ) -> Result<MigrationReport, MigrationError> {
        let applied = ledger::applied(conn).await?;
        self.check_ledger(&applied)?;

        let pending = &self.steps[applied.len().min(end)..end];
        let mut report = MigrationReport::new(Direction::Up);
        if pending.is_empty() {
            debug!(applied = applied.len(), "schema is up to date");
            return Ok(report);
        }

        info!(count = pending.len(), "applying migrations");
        self.apply_all(conn, pending, &mut report).await?;
        Ok(report)
    }

    async fn revert_latest(
        &self,
        conn: &mut SqliteConnection,
        count: usize,
    ) -> Result<MigrationReport, MigrationError> {
        let applied = ledger::applied(conn).await?;
        self.check_ledger(&applied)?;

        let start = applied.len().saturating_sub(count);
        let targets = &self.steps[start..applied.len()];
        let mut report = MigrationReport::new(Direction::Down);
        if targets.is_empty() {
            debug!("nothing to revert");
            return Ok(report);
        }

        info!(count = targets.len(), "reverting migrations");
        self.revert_all(conn, targets, &mut report).await?;
        Ok(report)
    }

    async fn apply_all(
        &self,
        conn: &mut SqliteConnection,
        pending: &[Migration],
        report: &mut MigrationReport,
    ) -> Result<(), MigrationError> {
        // No-op inside a transaction, so it is toggled around the per-step transactions.
        set_foreign_keys(conn, false).await?;
        for step in pending {
            let started = Instant::now();
            apply(conn, step).await.inspect_err(|e| {
                error!(id = step.id, error = %e, "migration failed; schema left at previous step");
            })?;
            info!(id = step.id, elapsed_ms = started.elapsed().as_millis(), "applied");
            report.steps.push(StepReport {
                id: step.id,
                outcome: StepOutcome::Applied,
                elapsed: started.elapsed(),
            });
        }
        Ok(())
    }

    async fn revert_all(
        &self,
        conn: &mut SqliteConnection,
        targets: &[Migration],
        report: &mut MigrationReport,
    ) -> Result<(), MigrationError> {
        set_foreign_keys(conn, false).await?;
        for step in targets.iter().rev() {
            let started = Instant::now();
            let outcome = revert(conn, step).await.inspect_err(|e| {
                error!(id = step.id, error = %e, "revert failed; schema left at this step");
            })?;
            match &outcome {
                StepOutcome::Irreversible { reason } => warn!(
                    id = step.id,
                    reason = *reason,
                    "migration cannot be reverted automatically; manual intervention required"
                ),
                _ => info!(id = step.id, elapsed_ms = started.elapsed().as_millis(), "reverted"),
            }
            report.steps.push(StepReport {
                id: step.id,
                outcome,
                elapsed: started.elapsed(),
            });
        }
        Ok(())
    }

    /// Restore enforcement and drop the lock; failures here must not mask the run's result.
    async fn finish_run(&self, conn: &mut SqliteConnection) {
        if let Err(e) = set_foreign_keys(conn, true).await {
            warn!(error = %e, "failed to re-enable foreign keys");
        }
        if let Err(e) = ledger::release_lock(conn, &self.holder).await {
            warn!(holder = %self.holder, error = %e, "failed to release migration lock");
        }
    }

    fn position(&self, id: &str) -> Result<usize, MigrationError> {
        self.steps
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| MigrationError::UnknownTarget { id: id.to_string() })
    }

    /// The ledger must be a prefix of the registered chain.
    fn check_ledger(&self, applied: &[AppliedMigration]) -> Result<(), MigrationError> {
        for (i, row) in applied.iter().enumerate() {
            match self.steps.get(i) {
                Some(step) if step.id == row.id => {}
                expected => {
                    if !self.steps.iter().any(|s| s.id == row.id) {
                        return Err(MigrationError::UnknownAppliedStep { id: row.id.clone() });
                    }
                    // A known id in the wrong slot means a step in between was never applied.
                    let expected = expected.map(|s| s.id).unwrap_or_default();
                    return Err(MigrationError::LedgerOutOfOrder {
                        found: row.id.clone(),
                        expected,
                    });
                }
            }
        }
        Ok(())
    }
}

async fn set_foreign_keys(conn: &mut SqliteConnection, on: bool) -> Result<(), MigrationError> {
    let pragma = if on {
        "PRAGMA foreign_keys = ON"
    } else {
        "PRAGMA foreign_keys = OFF"
    };
    sqlx::query(pragma).execute(&mut *conn).await?;
    Ok(())
}

async fn apply(conn: &mut SqliteConnection, step: &Migration) -> Result<(), MigrationError> {
    let mut tx = conn.begin().await?;
    run_statements(&mut tx, step, Direction::Up, step.up).await?;
    verify_references(&mut tx, step).await?;
    ledger::record(&mut tx, step, Utc::now()).await?;
    tx.commit().await?;
    Ok(())
}

async fn revert(
    conn: &mut SqliteConnection,
    step: &Migration,
) -> Result<StepOutcome, MigrationError> {
    let mut tx = conn.begin().await?;
    let outcome = match step.down {
        Revert::Sql(statements) => {
            run_statements(&mut tx, step, Direction::Down, statements).await?;
            verify_references(&mut tx, step).await?;
            StepOutcome::Reverted
        }
        Revert::Irreversible { reason } => StepOutcome::Irreversible { reason },
    };
    ledger::remove(&mut tx, step.id).await?;
    tx.commit().await?;
    Ok(outcome)
}

async fn run_statements(
    conn: &mut SqliteConnection,
    step: &Migration,
    direction: Direction,
    statements: &[&str],
) -> Result<(), MigrationError> {
    for stmt in statements {
        sqlx::query(stmt)
            .execute(&mut *conn)
            .await
            .map_err(|source| MigrationError::StepFailed {
                id: step.id,
                direction,
                source,
            })?;
    }
    Ok(())
}

/// Every foreign key must point at an existing table and every row must satisfy it.
async fn verify_references(
    conn: &mut SqliteConnection,
    step: &Migration,
) -> Result<(), MigrationError> {
    let dangling: Option<(String, String)> = sqlx::query_as(
        r#"SELECT m.name, f."table"
           FROM sqlite_master AS m
           JOIN pragma_foreign_key_list(m.name) AS f
           WHERE m.type = 'table'
             AND f."table" NOT IN (SELECT name FROM sqlite_master WHERE type = 'table')
           LIMIT 1"#,
    )
    .fetch_optional(&mut *conn)
    .await?;
    if let Some((table, references)) = dangling {
        return Err(MigrationError::DanglingReference {
            id: step.id,
            table,
            references,
        });
    }

    let violations = sqlx::query("PRAGMA foreign_key_check")
        .fetch_all(&mut *conn)
        .await?;
    if let Some(first) = violations.first() {
        let table: String = first.try_get(0)?;
        return Err(MigrationError::ForeignKeyViolation {
            id: step.id,
            table,
            count: violations.len(),
        });
    }
    Ok(())
}
