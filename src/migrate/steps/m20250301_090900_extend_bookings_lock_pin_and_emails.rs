//! Adds lock-PIN assignment and guest email tracking to `bookings`.
//!
//! SQLite refuses to drop a column that carries a foreign key, so the revert
//! rebuilds `bookings` in its baseline shape. The runner has foreign keys off
//! while this happens, which keeps the drop from cascading into stays and reviews.

use super::m20250101_000000_create_core_tables::{
    BOOKINGS_INDEXES, bookings_column_names, bookings_columns,
};
use crate::migrate::{Migration, Revert};

pub const MIGRATION: Migration = Migration {
    id: "20250301090900_extend_bookings_lock_pin_and_emails",
    description: "add assigned lock PIN, lock PIN reference and email-sent timestamps to bookings",
    up: &[
        "ALTER TABLE bookings ADD COLUMN assigned_lock_pin TEXT NULL",
        "ALTER TABLE bookings ADD COLUMN lock_pin_id INTEGER NULL \
         REFERENCES property_lock_pins(id) ON UPDATE CASCADE ON DELETE SET NULL",
        "ALTER TABLE bookings ADD COLUMN pre_stay_email_sent_at TEXT NULL",
        "ALTER TABLE bookings ADD COLUMN post_stay_email_sent_at TEXT NULL",
        "CREATE INDEX idx_bookings_lock_pin_id ON bookings(lock_pin_id)",
    ],
    down: Revert::Sql(&[
        "DROP INDEX idx_bookings_lock_pin_id",
        concat!("CREATE TABLE bookings_rebuild (", bookings_columns!(), ")"),
        concat!(
            "INSERT INTO bookings_rebuild (",
            bookings_column_names!(),
            ") SELECT ",
            bookings_column_names!(),
            " FROM bookings"
        ),
        "DROP TABLE bookings",
        "ALTER TABLE bookings_rebuild RENAME TO bookings",
        BOOKINGS_INDEXES[0],
        BOOKINGS_INDEXES[1],
    ]),
};
