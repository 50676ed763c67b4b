use super::SqlitePool;
use super::models::{Booking, BookingStatus};
use crate::error::StayError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

const SELECT_BOOKING: &str = r#"SELECT b.id, b.property_id, b.guest_name, b.guest_email,
    b.guest_phone, b.check_in_date, b.check_out_date, b.guest_count, b.total_amount, b.status,
    b.assigned_lock_pin, b.lock_pin_id, b.pre_stay_email_sent_at, b.post_stay_email_sent_at,
    b.created_at, b.updated_at
    FROM bookings b"#;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBooking {
    pub property_id: i64,
    pub guest_name: String,
    pub guest_email: Option<String>,
    pub guest_phone: Option<String>,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub guest_count: i64,
    pub total_amount: Option<f64>,
    pub status: BookingStatus,
}

/// Which guest email a booking is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StayEmail {
    PreStay,
    PostStay,
}

#[derive(Clone)]
pub struct BookingStore {
    pool: SqlitePool,
}

impl BookingStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn create(&self, new: NewBooking) -> Result<i64, StayError> {
        if new.check_out_date <= new.check_in_date {
            return Err(StayError::Validation {
                field: "check_out_date",
                message: format!(
                    "{} is not after check-in {}",
                    new.check_out_date, new.check_in_date
                ),
            });
        }
        let id = sqlx::query(
            r#"INSERT INTO bookings (
                property_id, guest_name, guest_email, guest_phone,
                check_in_date, check_out_date, guest_count, total_amount, status
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(new.property_id)
        .bind(new.guest_name)
        .bind(new.guest_email)
        .bind(new.guest_phone)
        .bind(new.check_in_date)
        .bind(new.check_out_date)
        .bind(new.guest_count)
        .bind(new.total_amount)
        .bind(new.status)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();
        Ok(id)
    }

    pub async fn get(&self, id: i64) -> Result<Booking, StayError> {
        let sql = format!("{SELECT_BOOKING} WHERE b.id = ?");
        sqlx::query_as::<_, Booking>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StayError::not_found("booking", id))
    }

    pub async fn list_for_property(&self, property_id: i64) -> Result<Vec<Booking>, StayError> {
        let sql =
            format!("{SELECT_BOOKING} WHERE b.property_id = ? ORDER BY b.check_in_date, b.id");
        let rows = sqlx::query_as::<_, Booking>(&sql)
            .bind(property_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn delete(&self, id: i64) -> Result<(), StayError> {
        let deleted = sqlx::query("DELETE FROM bookings WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if deleted == 0 {
            return Err(StayError::not_found("booking", id));
        }
        Ok(())
    }

    pub async fn set_status(&self, id: i64, status: BookingStatus) -> Result<(), StayError> {
        let updated = sqlx::query("UPDATE bookings SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if updated == 0 {
            return Err(StayError::not_found("booking", id));
        }
        Ok(())
    }

    pub async fn mark_email_sent(
        &self,
        id: i64,
        email: StayEmail,
        at: DateTime<Utc>,
    ) -> Result<(), StayError> {
        let sql = match email {
            StayEmail::PreStay => {
                "UPDATE bookings SET pre_stay_email_sent_at = ?, updated_at = ? WHERE id = ?"
            }
            StayEmail::PostStay => {
                "UPDATE bookings SET post_stay_email_sent_at = ?, updated_at = ? WHERE id = ?"
            }
        };
        let updated = sqlx::query(sql)
            .bind(at)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if updated == 0 {
            return Err(StayError::not_found("booking", id));
        }
        Ok(())
    }

    /// Bookings whose `email` is due on `today` and has not been sent yet.
    ///
    /// Pre-stay: the check-in is today or later and at most `pre_stay_email_days`
    /// away. Post-stay: `post_stay_email_days` have passed since check-out.
    /// Properties without a settings row use the column defaults (3 and 1 days, enabled).
    pub async fn due_for_email(
        &self,
        email: StayEmail,
        today: NaiveDate,
    ) -> Result<Vec<Booking>, StayError> {
        let filter = match email {
            StayEmail::PreStay => {
                r#"WHERE b.pre_stay_email_sent_at IS NULL
                   AND b.status IN ('pending', 'confirmed')
                   AND COALESCE(s.pre_stay_email_enabled, 1) = 1
                   AND b.check_in_date >= ?
                   AND date(b.check_in_date, '-' || COALESCE(s.pre_stay_email_days, 3) || ' days') <= ?"#
            }
            StayEmail::PostStay => {
                r#"WHERE b.post_stay_email_sent_at IS NULL
                   AND b.status <> 'cancelled'
                   AND COALESCE(s.post_stay_email_enabled, 1) = 1
                   AND b.check_out_date <= ?
                   AND date(b.check_out_date, '+' || COALESCE(s.post_stay_email_days, 1) || ' days') <= ?"#
            }
        };
        let sql = format!(
            "{SELECT_BOOKING} LEFT JOIN property_settings s ON s.property_id = b.property_id \
             {filter} ORDER BY b.check_in_date, b.id"
        );
        let rows = sqlx::query_as::<_, Booking>(&sql)
            .bind(today)
            .bind(today)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
