use crate::migrate::{Migration, Revert};

pub const MIGRATION: Migration = Migration {
    id: "20250301090700_create_email_templates",
    description: "create per-property email_templates",
    up: &[
        r#"
CREATE TABLE email_templates (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    property_id INTEGER NOT NULL REFERENCES properties(id) ON UPDATE CASCADE ON DELETE CASCADE,
    name TEXT NOT NULL,
    template_type TEXT NOT NULL
        CHECK (template_type IN ('pre_stay', 'post_stay', 'booking_confirmation', 'custom')),
    subject TEXT NOT NULL,
    html_body TEXT NOT NULL,
    text_body TEXT NULL,
    days_before_check_in INTEGER NULL,
    days_after_check_out INTEGER NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    include_lock_pin INTEGER NOT NULL DEFAULT 0,
    available_variables TEXT NOT NULL DEFAULT '{"guest":["guestName","guestEmail","guestPhone"],"booking":["checkInDate","checkOutDate","numberOfGuests","numberOfNights","totalAmount"],"property":["propertyName","propertyAddress","wifiName","wifiPassword","houseRules","checkInInstructions","checkOutInstructions"],"pin":["lockPin"],"owner":["ownerName","ownerEmail","ownerPhone"]}',
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
)"#,
        "CREATE INDEX idx_email_templates_property_type ON email_templates(property_id, template_type)",
    ],
    down: Revert::Sql(&["DROP TABLE email_templates"]),
};
