use super::SqlitePool;
use super::models::{Review, ReviewPlatform};
use crate::error::StayError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

const SELECT_REVIEW: &str = r#"SELECT id, property_id, booking_id, guest_id, reviewer_name,
    overall_rating, cleanliness_rating, communication_rating, check_in_rating,
    accuracy_rating, location_rating, value_rating, review_text, platform,
    external_review_id, is_verified, is_published, owner_response, owner_responded_at,
    review_date, created_at, updated_at
    FROM reviews"#;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubScores {
    pub cleanliness: Option<i64>,
    pub communication: Option<i64>,
    pub check_in: Option<i64>,
    pub accuracy: Option<i64>,
    pub location: Option<i64>,
    pub value: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReview {
    pub property_id: i64,
    pub booking_id: Option<i64>,
    pub guest_id: Option<i64>,
    pub reviewer_name: Option<String>,
    pub overall_rating: i64,
    pub scores: SubScores,
    pub review_text: Option<String>,
    pub platform: ReviewPlatform,
    pub external_review_id: Option<String>,
    pub is_verified: bool,
    pub review_date: Option<DateTime<Utc>>,
}

/// Averages over published reviews; sub-score averages skip missing scores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow)]
pub struct RatingSummary {
    pub review_count: i64,
    pub overall: Option<f64>,
    pub cleanliness: Option<f64>,
    pub communication: Option<f64>,
    pub check_in: Option<f64>,
    pub accuracy: Option<f64>,
    pub location: Option<f64>,
    pub value: Option<f64>,
}

#[derive(Clone)]
pub struct ReviewStore {
    pool: SqlitePool,
}

impl ReviewStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn create(&self, new: NewReview) -> Result<i64, StayError> {
        check_rating("overall_rating", Some(new.overall_rating))?;
        let s = &new.scores;
        check_rating("cleanliness_rating", s.cleanliness)?;
        check_rating("communication_rating", s.communication)?;
        check_rating("check_in_rating", s.check_in)?;
        check_rating("accuracy_rating", s.accuracy)?;
        check_rating("location_rating", s.location)?;
        check_rating("value_rating", s.value)?;

        let id = sqlx::query(
            r#"INSERT INTO reviews (
                property_id, booking_id, guest_id, reviewer_name, overall_rating,
                cleanliness_rating, communication_rating, check_in_rating,
                accuracy_rating, location_rating, value_rating, review_text,
                platform, external_review_id, is_verified, review_date
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, COALESCE(?, ?))"#,
        )
        .bind(new.property_id)
        .bind(new.booking_id)
        .bind(new.guest_id)
        .bind(new.reviewer_name)
        .bind(new.overall_rating)
        .bind(s.cleanliness)
        .bind(s.communication)
        .bind(s.check_in)
        .bind(s.accuracy)
        .bind(s.location)
        .bind(s.value)
        .bind(new.review_text)
        .bind(new.platform)
        .bind(new.external_review_id)
        .bind(new.is_verified)
        .bind(new.review_date)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .last_insert_rowid();
        Ok(id)
    }

    pub async fn get(&self, id: i64) -> Result<Review, StayError> {
        let sql = format!("{SELECT_REVIEW} WHERE id = ?");
        sqlx::query_as::<_, Review>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StayError::not_found("review", id))
    }

    pub async fn list_for_property(
        &self,
        property_id: i64,
        published_only: bool,
    ) -> Result<Vec<Review>, StayError> {
        let sql = format!(
            "{SELECT_REVIEW} WHERE property_id = ? AND (? = 0 OR is_published = 1) \
             ORDER BY review_date DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, Review>(&sql)
            .bind(property_id)
            .bind(published_only)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn set_published(&self, id: i64, published: bool) -> Result<(), StayError> {
        let updated =
            sqlx::query("UPDATE reviews SET is_published = ?, updated_at = ? WHERE id = ?")
                .bind(published)
                .bind(Utc::now())
                .bind(id)
                .execute(&self.pool)
                .await?
                .rows_affected();
        if updated == 0 {
            return Err(StayError::not_found("review", id));
        }
        Ok(())
    }

    pub async fn respond(&self, id: i64, response: &str) -> Result<(), StayError> {
        let now = Utc::now();
        let updated = sqlx::query(
            r#"UPDATE reviews SET owner_response = ?, owner_responded_at = ?, updated_at = ?
               WHERE id = ?"#,
        )
        .bind(response)
        .bind(now)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?
        .rows_affected();
        if updated == 0 {
            return Err(StayError::not_found("review", id));
        }
        Ok(())
    }

    pub async fn summary(&self, property_id: i64) -> Result<RatingSummary, StayError> {
        let summary = sqlx::query_as::<_, RatingSummary>(
            r#"SELECT COUNT(*) AS review_count,
                   AVG(overall_rating) AS overall,
                   AVG(cleanliness_rating) AS cleanliness,
                   AVG(communication_rating) AS communication,
                   AVG(check_in_rating) AS check_in,
                   AVG(accuracy_rating) AS accuracy,
                   AVG(location_rating) AS location,
                   AVG(value_rating) AS value
               FROM reviews WHERE property_id = ? AND is_published = 1"#,
        )
        .bind(property_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(summary)
    }
}

fn check_rating(field: &'static str, rating: Option<i64>) -> Result<(), StayError> {
    match rating {
        Some(r) if !(1..=5).contains(&r) => Err(StayError::Validation {
            field,
            message: format!("{r} is outside 1..=5"),
        }),
        _ => Ok(()),
    }
}
