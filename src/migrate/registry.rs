use super::steps::*;
use super::{Migration, MigrationError};

/// The full chain, oldest first.
pub fn migrations() -> Vec<Migration> {
    vec![
        m20250101_000000_create_core_tables::MIGRATION,
        m20250301_090000_create_guests::MIGRATION,
        m20250301_090100_create_guest_stays::MIGRATION,
        m20250301_090200_create_property_lock_pins::MIGRATION,
        m20250301_090300_create_property_settings::MIGRATION,
        m20250301_090400_create_property_contacts::MIGRATION,
        m20250301_090500_add_cleaner_role::MIGRATION,
        m20250301_090600_create_property_cleaners::MIGRATION,
        m20250301_090700_create_email_templates::MIGRATION,
        m20250301_090800_create_reviews::MIGRATION,
        m20250301_090900_extend_bookings_lock_pin_and_emails::MIGRATION,
    ]
}

/// Ids must carry a 14-digit timestamp prefix and be strictly ascending.
pub fn validate_registry(steps: &[Migration]) -> Result<(), MigrationError> {
    if let Some(bad) = steps.iter().find(|m| !is_timestamp_prefixed(m.id)) {
        return Err(MigrationError::MalformedId { id: bad.id });
    }
    for pair in steps.windows(2) {
        if pair[0].id >= pair[1].id {
            return Err(MigrationError::UnorderedRegistry {
                previous: pair[0].id,
                next: pair[1].id,
            });
        }
    }
    Ok(())
}

fn is_timestamp_prefixed(id: &str) -> bool {
    let bytes = id.as_bytes();
    bytes.len() > 15 && bytes[..14].iter().all(u8::is_ascii_digit) && bytes[14] == b'_'
}
