//! Ordered schema migration chain for the rental operations database.
//!
//! Every [`Migration`] is a compiled-in unit with a timestamp-prefixed id, the
//! statements that apply it and a [`Revert`] describing how (or whether) it can
//! be undone. The [`Migrator`] applies them one at a time on a single
//! connection, each step inside its own transaction together with the ledger
//! row that records it, so a step is either fully applied or not at all.
//!
//! Files:
//!
//! - `registry.rs`: the chain, in order, plus validation of its ids
//! - `ledger.rs`: `_schema_migrations` (applied steps) and the run lock
//! - `runner.rs`: [`Migrator`] with `status`, `up`, `down` and `force_unlock`
//! - `steps/`: one file per step, `mYYYYMMDD_HHMMSS_<name>.rs`
//!
//! # Adding a step
//!
//! 1. Create `steps/mYYYYMMDD_HHMMSS_<name>.rs` exporting `pub const MIGRATION: Migration`
//! 2. Export the module from `steps/mod.rs`
//! 3. Append it to [`registry::migrations`]

mod error;
mod ledger;
pub mod registry;
mod runner;
pub mod steps;

pub use error::MigrationError;
pub use ledger::AppliedMigration;
pub use registry::{migrations, validate_registry};
pub use runner::Migrator;

use std::fmt;
use std::time::Duration;

/// One forward/backward schema change.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub id: &'static str,
    pub description: &'static str,
    pub up: &'static [&'static str],
    pub down: Revert,
}

/// How a migration is undone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Revert {
    Sql(&'static [&'static str]),
    /// The change cannot be removed by the database; reverting only moves the
    /// ledger and asks the operator to intervene.
    Irreversible { reason: &'static str },
}

impl Migration {
    pub fn is_reversible(&self) -> bool {
        matches!(self.down, Revert::Sql(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => f.write_str("up"),
            Direction::Down => f.write_str("down"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Applied,
    Reverted,
    Irreversible { reason: &'static str },
}

#[derive(Debug, Clone)]
pub struct StepReport {
    pub id: &'static str,
    pub outcome: StepOutcome,
    pub elapsed: Duration,
}

/// What a single `up` or `down` run did, in execution order.
#[derive(Debug, Clone)]
pub struct MigrationReport {
    pub direction: Direction,
    pub steps: Vec<StepReport>,
}

impl MigrationReport {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            steps: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.id).collect()
    }

    /// Steps whose revert needs manual follow-up.
    pub fn irreversible(&self) -> impl Iterator<Item = &StepReport> {
        self.steps
            .iter()
            .filter(|s| matches!(s.outcome, StepOutcome::Irreversible { .. }))
    }
}

/// A registered step and, when applied, the time it was recorded.
#[derive(Debug, Clone)]
pub struct StepStatus {
    pub id: &'static str,
    pub description: &'static str,
    pub reversible: bool,
    pub applied_at: Option<chrono::DateTime<chrono::Utc>>,
}
