use crate::migrate::{Migration, Revert};

pub const MIGRATION: Migration = Migration {
    id: "20250301090800_create_reviews",
    description: "create reviews with sub-scores and owner responses",
    up: &[
        r#"
CREATE TABLE reviews (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    property_id INTEGER NOT NULL REFERENCES properties(id) ON UPDATE CASCADE ON DELETE CASCADE,
    booking_id INTEGER NULL REFERENCES bookings(id) ON UPDATE CASCADE ON DELETE SET NULL,
    guest_id INTEGER NULL REFERENCES guests(id) ON UPDATE CASCADE ON DELETE SET NULL,
    reviewer_name TEXT NULL,
    overall_rating INTEGER NOT NULL CHECK (overall_rating BETWEEN 1 AND 5),
    cleanliness_rating INTEGER NULL CHECK (cleanliness_rating BETWEEN 1 AND 5),
    communication_rating INTEGER NULL CHECK (communication_rating BETWEEN 1 AND 5),
    check_in_rating INTEGER NULL CHECK (check_in_rating BETWEEN 1 AND 5),
    accuracy_rating INTEGER NULL CHECK (accuracy_rating BETWEEN 1 AND 5),
    location_rating INTEGER NULL CHECK (location_rating BETWEEN 1 AND 5),
    value_rating INTEGER NULL CHECK (value_rating BETWEEN 1 AND 5),
    review_text TEXT NULL,
    platform TEXT NOT NULL DEFAULT 'direct'
        CHECK (platform IN ('direct', 'airbnb', 'vrbo', 'booking_com', 'other')),
    external_review_id TEXT NULL,
    is_verified INTEGER NOT NULL DEFAULT 0,
    is_published INTEGER NOT NULL DEFAULT 1,
    owner_response TEXT NULL,
    owner_responded_at TEXT NULL,
    review_date TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
)"#,
        "CREATE INDEX idx_reviews_property_published ON reviews(property_id, is_published)",
        "CREATE INDEX idx_reviews_booking_id ON reviews(booking_id)",
        "CREATE INDEX idx_reviews_guest_id ON reviews(guest_id)",
    ],
    down: Revert::Sql(&["DROP TABLE reviews"]),
};
