use crate::db::SqlitePool;
use crate::db::lock_pins::SELECT_PIN;
use crate::db::models::LockPin;
use crate::error::StayError;
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

/// Result of handing a PIN to a booking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignedPin {
    pub booking_id: i64,
    pub lock_pin_id: i64,
    pub pin: String,
    pub order_index: i64,
    /// Rotation cursor after this assignment; `None` when rotation is off.
    pub next_pin_index: Option<i64>,
}

/// Cycles a property's active lock PINs across its bookings.
#[derive(Clone)]
pub struct PinRotation {
    pool: SqlitePool,
}

impl PinRotation {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Pick a PIN for the booking and record the assignment on both sides.
    ///
    /// With rotation off the lowest-ordered active PIN is used every time. With
    /// rotation on, the first active PIN at or after the settings cursor is used
    /// (wrapping to the lowest) and the cursor moves past it.
    pub async fn assign_to_booking(&self, booking_id: i64) -> Result<AssignedPin, StayError> {
        let mut tx = self.pool.begin().await?;

        let (property_id,): (i64,) = sqlx::query_as("SELECT property_id FROM bookings WHERE id = ?")
            .bind(booking_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StayError::not_found("booking", booking_id))?;

        let settings: Option<(bool, i64)> = sqlx::query_as(
            r#"SELECT pin_rotation_enabled, current_pin_index
               FROM property_settings WHERE property_id = ?"#,
        )
        .bind(property_id)
        .fetch_optional(&mut *tx)
        .await?;
        let (rotating, cursor) = settings.unwrap_or((false, 0));

        let sql =
            format!("{SELECT_PIN} WHERE property_id = ? AND is_active = 1 ORDER BY order_index");
        let pins = sqlx::query_as::<_, LockPin>(&sql)
            .bind(property_id)
            .fetch_all(&mut *tx)
            .await?;

        let chosen = select_pin(&pins, rotating, cursor)
            .ok_or(StayError::NoActivePin { property_id })?;
        let now = Utc::now();

        sqlx::query(
            r#"UPDATE bookings SET assigned_lock_pin = ?, lock_pin_id = ?, updated_at = ?
               WHERE id = ?"#,
        )
        .bind(&chosen.pin)
        .bind(chosen.id)
        .bind(now)
        .bind(booking_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"UPDATE property_lock_pins
               SET usage_count = usage_count + 1, last_used_at = ?, updated_at = ?
               WHERE id = ?"#,
        )
        .bind(now)
        .bind(now)
        .bind(chosen.id)
        .execute(&mut *tx)
        .await?;

        let next_pin_index = if rotating {
            let next = chosen.order_index + 1;
            sqlx::query(
                r#"UPDATE property_settings SET current_pin_index = ?, updated_at = ?
                   WHERE property_id = ?"#,
            )
            .bind(next)
            .bind(now)
            .bind(property_id)
            .execute(&mut *tx)
            .await?;
            Some(next)
        } else {
            None
        };

        tx.commit().await?;

        if rotating {
            info!(booking_id, property_id, order_index = chosen.order_index, "rotated lock PIN");
        } else {
            debug!(booking_id, property_id, order_index = chosen.order_index, "assigned lock PIN");
        }

        Ok(AssignedPin {
            booking_id,
            lock_pin_id: chosen.id,
            pin: chosen.pin.clone(),
            order_index: chosen.order_index,
            next_pin_index,
        })
    }
}

/// `pins` must be active and sorted by `order_index`.
fn select_pin(pins: &[LockPin], rotating: bool, cursor: i64) -> Option<&LockPin> {
    if !rotating {
        return pins.first();
    }
    pins.iter()
        .find(|p| p.order_index >= cursor)
        .or_else(|| pins.first())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pin(id: i64, order_index: i64) -> LockPin {
        let now = Utc::now();
        LockPin {
            id,
            property_id: 1,
            pin: format!("{:04}", id),
            label: None,
            order_index,
            is_active: true,
            last_used_at: None,
            usage_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn fixed_mode_always_takes_lowest() {
        let pins = vec![pin(10, 0), pin(11, 1)];
        assert_eq!(select_pin(&pins, false, 1).map(|p| p.id), Some(10));
    }

    #[test]
    fn rotation_skips_gaps_and_wraps() {
        // Index 1 was deactivated, so it is absent from the list.
        let pins = vec![pin(10, 0), pin(12, 2), pin(13, 3)];
        assert_eq!(select_pin(&pins, true, 1).map(|p| p.id), Some(12));
        assert_eq!(select_pin(&pins, true, 3).map(|p| p.id), Some(13));
        assert_eq!(select_pin(&pins, true, 4).map(|p| p.id), Some(10));
    }

    #[test]
    fn no_pins_no_selection() {
        assert!(select_pin(&[], true, 0).is_none());
        assert!(select_pin(&[], false, 0).is_none());
    }
}
