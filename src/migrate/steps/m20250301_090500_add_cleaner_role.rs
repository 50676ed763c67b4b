//! Adds `cleaner` to the user role domain.
//!
//! The insert is guarded so re-running it is harmless. The revert never removes
//! the value: users may already hold it, and shrinking the domain would mean
//! rebuilding every table that references it.

use crate::migrate::{Migration, Revert};

pub const MIGRATION: Migration = Migration {
    id: "20250301090500_add_cleaner_role",
    description: "add 'cleaner' to the user role values",
    up: &[r#"
INSERT INTO user_role_values (value)
SELECT 'cleaner'
WHERE NOT EXISTS (SELECT 1 FROM user_role_values WHERE value = 'cleaner')"#],
    down: Revert::Irreversible {
        reason: "role values cannot be removed once added; delete 'cleaner' from user_role_values by hand after reassigning its users",
    },
};
