//! Baseline: users and their role domain, properties, cleaners and bookings.
//!
//! Everything later in the chain hangs off these tables.

use crate::migrate::{Migration, Revert};

/// Column list of `bookings` as created here; reused when later steps rebuild the table.
macro_rules! bookings_columns {
    () => {
        r#"
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    property_id INTEGER NOT NULL REFERENCES properties(id) ON UPDATE CASCADE ON DELETE CASCADE,
    guest_name TEXT NOT NULL,
    guest_email TEXT NULL,
    guest_phone TEXT NULL,
    check_in_date TEXT NOT NULL,
    check_out_date TEXT NOT NULL,
    guest_count INTEGER NOT NULL DEFAULT 1,
    total_amount REAL NULL,
    status TEXT NOT NULL DEFAULT 'confirmed'
        CHECK (status IN ('pending', 'confirmed', 'checked_in', 'checked_out', 'cancelled')),
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
"#
    };
}
pub(crate) use bookings_columns;

macro_rules! bookings_column_names {
    () => {
        "id, property_id, guest_name, guest_email, guest_phone, check_in_date, check_out_date, \
         guest_count, total_amount, status, created_at, updated_at"
    };
}
pub(crate) use bookings_column_names;

pub(crate) const BOOKINGS_INDEXES: [&str; 2] = [
    "CREATE INDEX idx_bookings_property_id ON bookings(property_id)",
    "CREATE INDEX idx_bookings_check_in_date ON bookings(check_in_date)",
];

pub const MIGRATION: Migration = Migration {
    id: "20250101000000_create_core_tables",
    description: "create users, role values, properties, cleaners and bookings",
    up: &[
        // Extensible role domain; `users.role` references it.
        "CREATE TABLE user_role_values (value TEXT PRIMARY KEY NOT NULL)",
        "INSERT INTO user_role_values (value) VALUES ('admin'), ('owner'), ('manager')",
        r#"
CREATE TABLE users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'owner'
        REFERENCES user_role_values(value) ON UPDATE CASCADE ON DELETE RESTRICT,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
)"#,
        r#"
CREATE TABLE properties (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id INTEGER NULL REFERENCES users(id) ON UPDATE CASCADE ON DELETE SET NULL,
    name TEXT NOT NULL,
    address TEXT NULL,
    timezone TEXT NOT NULL DEFAULT 'UTC',
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
)"#,
        "CREATE INDEX idx_properties_owner_id ON properties(owner_id)",
        r#"
CREATE TABLE cleaners (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NULL REFERENCES users(id) ON UPDATE CASCADE ON DELETE SET NULL,
    name TEXT NOT NULL,
    email TEXT NULL,
    phone TEXT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
)"#,
        concat!("CREATE TABLE bookings (", bookings_columns!(), ")"),
        BOOKINGS_INDEXES[0],
        BOOKINGS_INDEXES[1],
    ],
    down: Revert::Sql(&[
        "DROP TABLE bookings",
        "DROP TABLE cleaners",
        "DROP TABLE properties",
        "DROP TABLE users",
        "DROP TABLE user_role_values",
    ]),
};
