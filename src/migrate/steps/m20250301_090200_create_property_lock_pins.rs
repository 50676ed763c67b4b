use crate::migrate::{Migration, Revert};

pub const MIGRATION: Migration = Migration {
    id: "20250301090200_create_property_lock_pins",
    description: "create property_lock_pins for smart-lock PIN rotation",
    up: &[
        r#"
CREATE TABLE property_lock_pins (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    property_id INTEGER NOT NULL REFERENCES properties(id) ON UPDATE CASCADE ON DELETE CASCADE,
    pin TEXT NOT NULL,
    label TEXT NULL,
    order_index INTEGER NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    last_used_at TEXT NULL,
    usage_count INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    UNIQUE (property_id, order_index)
)"#,
        "CREATE INDEX idx_property_lock_pins_property_active ON property_lock_pins(property_id, is_active)",
    ],
    down: Revert::Sql(&["DROP TABLE property_lock_pins"]),
};
