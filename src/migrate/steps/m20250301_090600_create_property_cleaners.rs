use crate::migrate::{Migration, Revert};

pub const MIGRATION: Migration = Migration {
    id: "20250301090600_create_property_cleaners",
    description: "create property_cleaners assignments",
    up: &[
        r#"
CREATE TABLE property_cleaners (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    property_id INTEGER NOT NULL REFERENCES properties(id) ON UPDATE CASCADE ON DELETE CASCADE,
    cleaner_id INTEGER NOT NULL REFERENCES cleaners(id) ON UPDATE CASCADE ON DELETE CASCADE,
    is_active INTEGER NOT NULL DEFAULT 1,
    assigned_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    UNIQUE (property_id, cleaner_id)
)"#,
        "CREATE INDEX idx_property_cleaners_cleaner_id ON property_cleaners(cleaner_id)",
    ],
    down: Revert::Sql(&["DROP TABLE property_cleaners"]),
};
