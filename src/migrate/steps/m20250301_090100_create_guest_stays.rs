use crate::migrate::{Migration, Revert};

pub const MIGRATION: Migration = Migration {
    id: "20250301090100_create_guest_stays",
    description: "create guest_stays joining guests, properties and bookings",
    up: &[
        r#"
CREATE TABLE guest_stays (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    guest_id INTEGER NOT NULL REFERENCES guests(id) ON UPDATE CASCADE ON DELETE CASCADE,
    property_id INTEGER NOT NULL REFERENCES properties(id) ON UPDATE CASCADE ON DELETE CASCADE,
    booking_id INTEGER NOT NULL UNIQUE REFERENCES bookings(id) ON UPDATE CASCADE ON DELETE CASCADE,
    check_in_date TEXT NOT NULL,
    check_out_date TEXT NOT NULL,
    nights INTEGER NOT NULL,
    guest_count INTEGER NOT NULL DEFAULT 1,
    total_amount REAL NULL,
    rating INTEGER NULL CHECK (rating BETWEEN 1 AND 5),
    review TEXT NULL,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
)"#,
        "CREATE INDEX idx_guest_stays_guest_id ON guest_stays(guest_id)",
        "CREATE INDEX idx_guest_stays_property_id ON guest_stays(property_id)",
    ],
    down: Revert::Sql(&["DROP TABLE guest_stays"]),
};
