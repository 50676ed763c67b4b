use super::SqlitePool;
use super::models::{Booking, Guest, GuestStay};
use crate::error::StayError;
use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use std::collections::BTreeSet;

const SELECT_GUEST: &str = r#"SELECT id, email, name, phone, total_stays, total_spent,
    first_stay_at, last_stay_at, preferences, marketing_opt_in, tags, notes,
    is_blacklisted, blacklist_reason, created_at, updated_at
    FROM guests"#;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewGuest {
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub marketing_opt_in: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewStay {
    pub guest_id: i64,
    pub booking_id: i64,
    pub rating: Option<i64>,
    pub review: Option<String>,
}

/// Guests are created on first contact and accumulate stays; they are never
/// deleted here.
#[derive(Clone)]
pub struct GuestStore {
    pool: SqlitePool,
}

impl GuestStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Upsert by unique (normalised) email. Returns the row id.
    pub async fn upsert_by_email(&self, new: NewGuest) -> Result<i64, StayError> {
        let email = normalize_email(&new.email);
        sqlx::query(
            r#"INSERT INTO guests (email, name, phone, marketing_opt_in)
               VALUES (?, ?, ?, COALESCE(?, 1))
               ON CONFLICT(email) DO UPDATE SET
                   name = excluded.name,
                   phone = COALESCE(excluded.phone, guests.phone),
                   marketing_opt_in = COALESCE(?, guests.marketing_opt_in),
                   updated_at = ?"#,
        )
        .bind(&email)
        .bind(new.name)
        .bind(new.phone)
        .bind(new.marketing_opt_in)
        .bind(new.marketing_opt_in)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        let rec: (i64,) = sqlx::query_as("SELECT id FROM guests WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(rec.0)
    }

    pub async fn get(&self, id: i64) -> Result<Guest, StayError> {
        let sql = format!("{SELECT_GUEST} WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StayError::not_found("guest", id))?;
        Self::row_to_model(row)
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<Guest>, StayError> {
        let sql = format!("{SELECT_GUEST} WHERE email = ?");
        sqlx::query(&sql)
            .bind(normalize_email(email))
            .fetch_optional(&self.pool)
            .await?
            .map(Self::row_to_model)
            .transpose()
    }

    /// `Some(reason)` blacklists the guest, `None` lifts it.
    pub async fn set_blacklist(&self, id: i64, reason: Option<&str>) -> Result<(), StayError> {
        let updated = sqlx::query(
            r#"UPDATE guests SET is_blacklisted = ?, blacklist_reason = ?, updated_at = ?
               WHERE id = ?"#,
        )
        .bind(reason.is_some())
        .bind(reason)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?
        .rows_affected();
        if updated == 0 {
            return Err(StayError::not_found("guest", id));
        }
        Ok(())
    }

    pub async fn set_tags(&self, id: i64, tags: &BTreeSet<String>) -> Result<(), StayError> {
        let tags_json = serde_json::to_string(tags)?;
        self.update_json_column(id, "tags", tags_json).await
    }

    pub async fn set_preferences(
        &self,
        id: i64,
        preferences: &Map<String, Value>,
    ) -> Result<(), StayError> {
        let prefs_json = serde_json::to_string(preferences)?;
        self.update_json_column(id, "preferences", prefs_json).await
    }

    pub async fn set_notes(&self, id: i64, notes: Option<&str>) -> Result<(), StayError> {
        let updated = sqlx::query("UPDATE guests SET notes = ?, updated_at = ? WHERE id = ?")
            .bind(notes)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if updated == 0 {
            return Err(StayError::not_found("guest", id));
        }
        Ok(())
    }

    async fn update_json_column(
        &self,
        id: i64,
        column: &'static str,
        json: String,
    ) -> Result<(), StayError> {
        let sql = format!("UPDATE guests SET {column} = ?, updated_at = ? WHERE id = ?");
        let updated = sqlx::query(&sql)
            .bind(json)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if updated == 0 {
            return Err(StayError::not_found("guest", id));
        }
        Ok(())
    }

    /// Finalise a booking's stay: insert the stay row and fold it into the
    /// guest's aggregates, in one transaction. A booking yields at most one stay.
    pub async fn record_stay(&self, new: NewStay) -> Result<GuestStay, StayError> {
        if let Some(rating) = new.rating.filter(|r| !(1..=5).contains(r)) {
            return Err(StayError::Validation {
                field: "rating",
                message: format!("{rating} is outside 1..=5"),
            });
        }

        let mut tx = self.pool.begin().await?;

        let booking = sqlx::query_as::<_, Booking>(
            r#"SELECT id, property_id, guest_name, guest_email, guest_phone, check_in_date,
               check_out_date, guest_count, total_amount, status, assigned_lock_pin, lock_pin_id,
               pre_stay_email_sent_at, post_stay_email_sent_at, created_at, updated_at
               FROM bookings WHERE id = ?"#,
        )
        .bind(new.booking_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StayError::not_found("booking", new.booking_id))?;

        let sql = format!("{SELECT_GUEST} WHERE id = ?");
        let guest = sqlx::query(&sql)
            .bind(new.guest_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StayError::not_found("guest", new.guest_id))
            .and_then(Self::row_to_model)?;

        let stay_id = sqlx::query(
            r#"INSERT INTO guest_stays (
                guest_id, property_id, booking_id, check_in_date, check_out_date,
                nights, guest_count, total_amount, rating, review
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(guest.id)
        .bind(booking.property_id)
        .bind(booking.id)
        .bind(booking.check_in_date)
        .bind(booking.check_out_date)
        .bind(booking.nights())
        .bind(booking.guest_count)
        .bind(booking.total_amount)
        .bind(new.rating)
        .bind(new.review)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        let stay_start: DateTime<Utc> = booking.check_in_date.and_time(NaiveTime::MIN).and_utc();
        let first = guest
            .first_stay_at
            .map_or(stay_start, |prev| prev.min(stay_start));
        let last = guest
            .last_stay_at
            .map_or(stay_start, |prev| prev.max(stay_start));

        sqlx::query(
            r#"UPDATE guests SET
                total_stays = total_stays + 1,
                total_spent = total_spent + ?,
                first_stay_at = ?,
                last_stay_at = ?,
                updated_at = ?
              WHERE id = ?"#,
        )
        .bind(booking.total_amount.unwrap_or(0.0))
        .bind(first)
        .bind(last)
        .bind(Utc::now())
        .bind(guest.id)
        .execute(&mut *tx)
        .await?;

        let stay = sqlx::query_as::<_, GuestStay>(
            r#"SELECT id, guest_id, property_id, booking_id, check_in_date, check_out_date,
               nights, guest_count, total_amount, rating, review, created_at, updated_at
               FROM guest_stays WHERE id = ?"#,
        )
        .bind(stay_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(stay)
    }

    pub async fn list_stays(&self, guest_id: i64) -> Result<Vec<GuestStay>, StayError> {
        let rows = sqlx::query_as::<_, GuestStay>(
            r#"SELECT id, guest_id, property_id, booking_id, check_in_date, check_out_date,
               nights, guest_count, total_amount, rating, review, created_at, updated_at
               FROM guest_stays WHERE guest_id = ? ORDER BY check_in_date, id"#,
        )
        .bind(guest_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    fn row_to_model(row: SqliteRow) -> Result<Guest, StayError> {
        let preferences_json: String = row.try_get("preferences")?;
        let tags_json: String = row.try_get("tags")?;

        Ok(Guest {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            name: row.try_get("name")?,
            phone: row.try_get("phone")?,
            total_stays: row.try_get("total_stays")?,
            total_spent: row.try_get("total_spent")?,
            first_stay_at: row.try_get("first_stay_at")?,
            last_stay_at: row.try_get("last_stay_at")?,
            preferences: serde_json::from_str(&preferences_json)?,
            marketing_opt_in: row.try_get("marketing_opt_in")?,
            tags: serde_json::from_str(&tags_json)?,
            notes: row.try_get("notes")?,
            is_blacklisted: row.try_get("is_blacklisted")?,
            blacklist_reason: row.try_get("blacklist_reason")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}
