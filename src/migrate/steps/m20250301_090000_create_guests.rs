use crate::migrate::{Migration, Revert};

pub const MIGRATION: Migration = Migration {
    id: "20250301090000_create_guests",
    description: "create guests",
    up: &[
        r#"
CREATE TABLE guests (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    phone TEXT NULL,
    total_stays INTEGER NOT NULL DEFAULT 0,
    total_spent REAL NOT NULL DEFAULT 0,
    first_stay_at TEXT NULL,
    last_stay_at TEXT NULL,
    preferences TEXT NOT NULL DEFAULT '{}', -- JSON object
    marketing_opt_in INTEGER NOT NULL DEFAULT 1,
    tags TEXT NOT NULL DEFAULT '[]', -- JSON array of strings
    notes TEXT NULL,
    is_blacklisted INTEGER NOT NULL DEFAULT 0,
    blacklist_reason TEXT NULL,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
)"#,
        "CREATE INDEX idx_guests_last_stay_at ON guests(last_stay_at)",
        "CREATE INDEX idx_guests_is_blacklisted ON guests(is_blacklisted)",
    ],
    down: Revert::Sql(&["DROP TABLE guests"]),
};
