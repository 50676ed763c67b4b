use crate::migrate::{Migration, Revert};

pub const MIGRATION: Migration = Migration {
    id: "20250301090400_create_property_contacts",
    description: "create property_contacts for owner and guest contacts",
    up: &[
        r#"
CREATE TABLE property_contacts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    property_id INTEGER NOT NULL REFERENCES properties(id) ON UPDATE CASCADE ON DELETE CASCADE,
    contact_type TEXT NOT NULL CHECK (contact_type IN ('owner', 'guest')),
    name TEXT NOT NULL,
    email TEXT NULL,
    phone TEXT NULL,
    is_primary INTEGER NOT NULL DEFAULT 0,
    receive_notifications INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
)"#,
        "CREATE INDEX idx_property_contacts_property_type ON property_contacts(property_id, contact_type)",
    ],
    down: Revert::Sql(&["DROP TABLE property_contacts"]),
};
