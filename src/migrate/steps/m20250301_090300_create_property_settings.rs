use crate::migrate::{Migration, Revert};

pub const MIGRATION: Migration = Migration {
    id: "20250301090300_create_property_settings",
    description: "create property_settings (one row per property)",
    up: &[r#"
CREATE TABLE property_settings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    property_id INTEGER NOT NULL UNIQUE REFERENCES properties(id) ON UPDATE CASCADE ON DELETE CASCADE,
    pin_rotation_enabled INTEGER NOT NULL DEFAULT 0,
    current_pin_index INTEGER NOT NULL DEFAULT 0,
    pre_stay_email_enabled INTEGER NOT NULL DEFAULT 1,
    pre_stay_email_days INTEGER NOT NULL DEFAULT 3,
    post_stay_email_enabled INTEGER NOT NULL DEFAULT 1,
    post_stay_email_days INTEGER NOT NULL DEFAULT 1,
    wifi_name TEXT NULL,
    wifi_password TEXT NULL,
    house_rules TEXT NULL,
    check_in_instructions TEXT NULL,
    check_out_instructions TEXT NULL,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
)"#],
    down: Revert::Sql(&["DROP TABLE property_settings"]),
};
