use super::SqlitePool;
use super::models::LockPin;
use crate::error::StayError;
use chrono::Utc;
use serde::{Deserialize, Serialize};

pub(crate) const SELECT_PIN: &str = r#"SELECT id, property_id, pin, label, order_index, is_active,
    last_used_at, usage_count, created_at, updated_at
    FROM property_lock_pins"#;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewLockPin {
    pub pin: String,
    pub label: Option<String>,
    /// Appended after the highest existing index when omitted.
    pub order_index: Option<i64>,
}

#[derive(Clone)]
pub struct LockPinStore {
    pool: SqlitePool,
}

impl LockPinStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Adds a PIN; `(property_id, order_index)` must be unused.
    pub async fn add(&self, property_id: i64, new: NewLockPin) -> Result<i64, StayError> {
        validate_pin(&new.pin)?;
        let mut tx = self.pool.begin().await?;
        let order_index = match new.order_index {
            Some(idx) => idx,
            None => {
                let (next,): (i64,) = sqlx::query_as(
                    r#"SELECT COALESCE(MAX(order_index) + 1, 0)
                       FROM property_lock_pins WHERE property_id = ?"#,
                )
                .bind(property_id)
                .fetch_one(&mut *tx)
                .await?;
                next
            }
        };
        let id = sqlx::query(
            r#"INSERT INTO property_lock_pins (property_id, pin, label, order_index)
               VALUES (?, ?, ?, ?)"#,
        )
        .bind(property_id)
        .bind(new.pin)
        .bind(new.label)
        .bind(order_index)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();
        tx.commit().await?;
        Ok(id)
    }

    pub async fn get(&self, id: i64) -> Result<LockPin, StayError> {
        let sql = format!("{SELECT_PIN} WHERE id = ?");
        sqlx::query_as::<_, LockPin>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StayError::not_found("lock pin", id))
    }

    /// Pins of a property in rotation order.
    pub async fn list(
        &self,
        property_id: i64,
        active_only: bool,
    ) -> Result<Vec<LockPin>, StayError> {
        let sql = format!(
            "{SELECT_PIN} WHERE property_id = ? AND (? = 0 OR is_active = 1) ORDER BY order_index"
        );
        let rows = sqlx::query_as::<_, LockPin>(&sql)
            .bind(property_id)
            .bind(active_only)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn set_active(&self, id: i64, active: bool) -> Result<(), StayError> {
        let updated =
            sqlx::query("UPDATE property_lock_pins SET is_active = ?, updated_at = ? WHERE id = ?")
                .bind(active)
                .bind(Utc::now())
                .bind(id)
                .execute(&self.pool)
                .await?
                .rows_affected();
        if updated == 0 {
            return Err(StayError::not_found("lock pin", id));
        }
        Ok(())
    }

    /// Bookings that used the pin keep their PIN text; their reference is cleared.
    pub async fn delete(&self, id: i64) -> Result<(), StayError> {
        let deleted = sqlx::query("DELETE FROM property_lock_pins WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if deleted == 0 {
            return Err(StayError::not_found("lock pin", id));
        }
        Ok(())
    }
}

fn validate_pin(pin: &str) -> Result<(), StayError> {
    if (4..=10).contains(&pin.len()) && pin.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(());
    }
    Err(StayError::Validation {
        field: "pin",
        message: "expected 4 to 10 digits".to_string(),
    })
}
