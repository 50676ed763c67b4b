//! Schema steps, one file per step.
//!
//! Files: `mYYYYMMDD_HHMMSS_<name>.rs`; the id inside each file is the same
//! timestamp without separators, which keeps ids sortable as plain strings.
//!
//! Table-creating steps are deliberately unguarded (no `IF NOT EXISTS`): the
//! ledger decides what runs, and an unexpected existing table fails the step.
//! Only the role extension guards itself, because its revert cannot remove
//! the value it adds.

pub mod m20250101_000000_create_core_tables;
pub mod m20250301_090000_create_guests;
pub mod m20250301_090100_create_guest_stays;
pub mod m20250301_090200_create_property_lock_pins;
pub mod m20250301_090300_create_property_settings;
pub mod m20250301_090400_create_property_contacts;
pub mod m20250301_090500_add_cleaner_role;
pub mod m20250301_090600_create_property_cleaners;
pub mod m20250301_090700_create_email_templates;
pub mod m20250301_090800_create_reviews;
pub mod m20250301_090900_extend_bookings_lock_pin_and_emails;
