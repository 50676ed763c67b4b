use super::SqlitePool;
use super::models::{
    Cleaner, ContactType, Property, PropertyCleaner, PropertyContact, PropertySettings, User,
    UserRole,
};
use crate::error::StayError;
use chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewProperty {
    pub owner_id: Option<i64>,
    pub name: String,
    pub address: Option<String>,
    /// Defaults to `UTC`.
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewCleaner {
    pub user_id: Option<i64>,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Partial settings; `None` keeps the stored (or column default) value.
/// Text fields take `Some(None)` to clear the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsInput {
    pub pin_rotation_enabled: Option<bool>,
    pub current_pin_index: Option<i64>,
    pub pre_stay_email_enabled: Option<bool>,
    pub pre_stay_email_days: Option<i64>,
    pub post_stay_email_enabled: Option<bool>,
    pub post_stay_email_days: Option<i64>,
    pub wifi_name: Option<Option<String>>,
    pub wifi_password: Option<Option<String>>,
    pub house_rules: Option<Option<String>>,
    pub check_in_instructions: Option<Option<String>>,
    pub check_out_instructions: Option<Option<String>>,
}

impl SettingsInput {
    fn validate(&self) -> Result<(), StayError> {
        for (field, value) in [
            ("current_pin_index", self.current_pin_index),
            ("pre_stay_email_days", self.pre_stay_email_days),
            ("post_stay_email_days", self.post_stay_email_days),
        ] {
            if let Some(v) = value.filter(|v| *v < 0) {
                return Err(StayError::Validation {
                    field,
                    message: format!("must not be negative, got {v}"),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewContact {
    pub contact_type: ContactType,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_primary: bool,
    pub receive_notifications: bool,
}

/// Properties and everything owned one-to-one or one-to-many by a property:
/// settings, contacts and cleaner assignments. Users and cleaners live here too.
#[derive(Clone)]
pub struct PropertyStore {
    pool: SqlitePool,
}

impl PropertyStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn create_user(
        &self,
        email: &str,
        name: &str,
        role: UserRole,
    ) -> Result<i64, StayError> {
        let id = sqlx::query("INSERT INTO users (email, name, role) VALUES (?, ?, ?)")
            .bind(email)
            .bind(name)
            .bind(role)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();
        Ok(id)
    }

    pub async fn get_user(&self, id: i64) -> Result<User, StayError> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, name, role, created_at, updated_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StayError::not_found("user", id))
    }

    pub async fn set_user_role(&self, id: i64, role: UserRole) -> Result<(), StayError> {
        let updated = sqlx::query("UPDATE users SET role = ?, updated_at = ? WHERE id = ?")
            .bind(role)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if updated == 0 {
            return Err(StayError::not_found("user", id));
        }
        Ok(())
    }

    /// Owned properties are kept with `owner_id` cleared; linked cleaners lose `user_id`.
    pub async fn delete_user(&self, id: i64) -> Result<(), StayError> {
        let deleted = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if deleted == 0 {
            return Err(StayError::not_found("user", id));
        }
        Ok(())
    }

    /// Role values currently accepted by `users.role`.
    pub async fn role_values(&self) -> Result<Vec<String>, StayError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT value FROM user_role_values ORDER BY value")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|(v,)| v).collect())
    }

    pub async fn create_property(&self, new: NewProperty) -> Result<i64, StayError> {
        let id = sqlx::query(
            "INSERT INTO properties (owner_id, name, address, timezone) VALUES (?, ?, ?, ?)",
        )
        .bind(new.owner_id)
        .bind(new.name)
        .bind(new.address)
        .bind(new.timezone.unwrap_or_else(|| "UTC".to_string()))
        .execute(&self.pool)
        .await?
        .last_insert_rowid();
        Ok(id)
    }

    pub async fn get_property(&self, id: i64) -> Result<Property, StayError> {
        sqlx::query_as::<_, Property>(
            r#"SELECT id, owner_id, name, address, timezone, created_at, updated_at
               FROM properties WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StayError::not_found("property", id))
    }

    /// Deletes the property; pins, settings, contacts, cleaner links, stays,
    /// templates, reviews and bookings go with it.
    pub async fn delete_property(&self, id: i64) -> Result<(), StayError> {
        let deleted = sqlx::query("DELETE FROM properties WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if deleted == 0 {
            return Err(StayError::not_found("property", id));
        }
        Ok(())
    }

    pub async fn create_cleaner(&self, new: NewCleaner) -> Result<i64, StayError> {
        let id = sqlx::query(
            "INSERT INTO cleaners (user_id, name, email, phone) VALUES (?, ?, ?, ?)",
        )
        .bind(new.user_id)
        .bind(new.name)
        .bind(new.email)
        .bind(new.phone)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();
        Ok(id)
    }

    pub async fn delete_cleaner(&self, id: i64) -> Result<(), StayError> {
        let deleted = sqlx::query("DELETE FROM cleaners WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if deleted == 0 {
            return Err(StayError::not_found("cleaner", id));
        }
        Ok(())
    }

    /// Inserts the settings row; a second row for the same property is rejected.
    pub async fn create_settings(
        &self,
        property_id: i64,
        input: SettingsInput,
    ) -> Result<PropertySettings, StayError> {
        input.validate()?;
        let mut tx = self.pool.begin().await?;
        sqlx::query("INSERT INTO property_settings (property_id) VALUES (?)")
            .bind(property_id)
            .execute(&mut *tx)
            .await?;
        Self::apply_settings(&mut tx, property_id, input).await?;
        tx.commit().await?;
        self.get_settings(property_id)
            .await?
            .ok_or_else(|| StayError::not_found("property settings", property_id))
    }

    pub async fn update_settings(
        &self,
        property_id: i64,
        input: SettingsInput,
    ) -> Result<PropertySettings, StayError> {
        input.validate()?;
        let mut conn = self.pool.acquire().await?;
        let updated = Self::apply_settings(&mut conn, property_id, input).await?;
        if updated == 0 {
            return Err(StayError::not_found("property settings", property_id));
        }
        drop(conn);
        self.get_settings(property_id)
            .await?
            .ok_or_else(|| StayError::not_found("property settings", property_id))
    }

    async fn apply_settings(
        conn: &mut sqlx::SqliteConnection,
        property_id: i64,
        input: SettingsInput,
    ) -> Result<u64, StayError> {
        let updated = sqlx::query(
            r#"UPDATE property_settings SET
                pin_rotation_enabled = COALESCE(?, pin_rotation_enabled),
                current_pin_index = COALESCE(?, current_pin_index),
                pre_stay_email_enabled = COALESCE(?, pre_stay_email_enabled),
                pre_stay_email_days = COALESCE(?, pre_stay_email_days),
                post_stay_email_enabled = COALESCE(?, post_stay_email_enabled),
                post_stay_email_days = COALESCE(?, post_stay_email_days),
                wifi_name = CASE WHEN ? THEN ? ELSE wifi_name END,
                wifi_password = CASE WHEN ? THEN ? ELSE wifi_password END,
                house_rules = CASE WHEN ? THEN ? ELSE house_rules END,
                check_in_instructions = CASE WHEN ? THEN ? ELSE check_in_instructions END,
                check_out_instructions = CASE WHEN ? THEN ? ELSE check_out_instructions END,
                updated_at = ?
              WHERE property_id = ?"#,
        )
        .bind(input.pin_rotation_enabled)
        .bind(input.current_pin_index)
        .bind(input.pre_stay_email_enabled)
        .bind(input.pre_stay_email_days)
        .bind(input.post_stay_email_enabled)
        .bind(input.post_stay_email_days)
        .bind(input.wifi_name.is_some())
        .bind(input.wifi_name.flatten())
        .bind(input.wifi_password.is_some())
        .bind(input.wifi_password.flatten())
        .bind(input.house_rules.is_some())
        .bind(input.house_rules.flatten())
        .bind(input.check_in_instructions.is_some())
        .bind(input.check_in_instructions.flatten())
        .bind(input.check_out_instructions.is_some())
        .bind(input.check_out_instructions.flatten())
        .bind(Utc::now())
        .bind(property_id)
        .execute(&mut *conn)
        .await?
        .rows_affected();
        Ok(updated)
    }

    pub async fn get_settings(
        &self,
        property_id: i64,
    ) -> Result<Option<PropertySettings>, StayError> {
        let row = sqlx::query_as::<_, PropertySettings>(
            r#"SELECT id, property_id, pin_rotation_enabled, current_pin_index,
               pre_stay_email_enabled, pre_stay_email_days,
               post_stay_email_enabled, post_stay_email_days,
               wifi_name, wifi_password, house_rules,
               check_in_instructions, check_out_instructions, created_at, updated_at
               FROM property_settings WHERE property_id = ?"#,
        )
        .bind(property_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Adds a contact. A new primary contact demotes the previous primary of the same type.
    pub async fn add_contact(&self, property_id: i64, new: NewContact) -> Result<i64, StayError> {
        let mut tx = self.pool.begin().await?;
        if new.is_primary {
            sqlx::query(
                r#"UPDATE property_contacts SET is_primary = 0, updated_at = ?
                   WHERE property_id = ? AND contact_type = ? AND is_primary = 1"#,
            )
            .bind(Utc::now())
            .bind(property_id)
            .bind(new.contact_type)
            .execute(&mut *tx)
            .await?;
        }
        let id = sqlx::query(
            r#"INSERT INTO property_contacts (
                property_id, contact_type, name, email, phone, is_primary, receive_notifications
            ) VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(property_id)
        .bind(new.contact_type)
        .bind(new.name)
        .bind(new.email)
        .bind(new.phone)
        .bind(new.is_primary)
        .bind(new.receive_notifications)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();
        tx.commit().await?;
        Ok(id)
    }

    pub async fn list_contacts(
        &self,
        property_id: i64,
        contact_type: Option<ContactType>,
    ) -> Result<Vec<PropertyContact>, StayError> {
        let rows = sqlx::query_as::<_, PropertyContact>(
            r#"SELECT id, property_id, contact_type, name, email, phone, is_primary,
               receive_notifications, created_at, updated_at
               FROM property_contacts
               WHERE property_id = ? AND (? IS NULL OR contact_type = ?)
               ORDER BY is_primary DESC, id"#,
        )
        .bind(property_id)
        .bind(contact_type)
        .bind(contact_type)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// The primary contact of a type, falling back to the oldest one.
    pub async fn primary_contact(
        &self,
        property_id: i64,
        contact_type: ContactType,
    ) -> Result<Option<PropertyContact>, StayError> {
        Ok(self
            .list_contacts(property_id, Some(contact_type))
            .await?
            .into_iter()
            .next())
    }

    /// Links a cleaner to a property; the pair must not already be linked.
    pub async fn assign_cleaner(
        &self,
        property_id: i64,
        cleaner_id: i64,
    ) -> Result<i64, StayError> {
        let id = sqlx::query(
            "INSERT INTO property_cleaners (property_id, cleaner_id, assigned_at) VALUES (?, ?, ?)",
        )
        .bind(property_id)
        .bind(cleaner_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .last_insert_rowid();
        Ok(id)
    }

    pub async fn set_cleaner_active(
        &self,
        property_id: i64,
        cleaner_id: i64,
        active: bool,
    ) -> Result<(), StayError> {
        let updated = sqlx::query(
            r#"UPDATE property_cleaners SET is_active = ?, updated_at = ?
               WHERE property_id = ? AND cleaner_id = ?"#,
        )
        .bind(active)
        .bind(Utc::now())
        .bind(property_id)
        .bind(cleaner_id)
        .execute(&self.pool)
        .await?
        .rows_affected();
        if updated == 0 {
            return Err(StayError::not_found("cleaner assignment", cleaner_id));
        }
        Ok(())
    }

    pub async fn unassign_cleaner(
        &self,
        property_id: i64,
        cleaner_id: i64,
    ) -> Result<(), StayError> {
        let deleted =
            sqlx::query("DELETE FROM property_cleaners WHERE property_id = ? AND cleaner_id = ?")
                .bind(property_id)
                .bind(cleaner_id)
                .execute(&self.pool)
                .await?
                .rows_affected();
        if deleted == 0 {
            return Err(StayError::not_found("cleaner assignment", cleaner_id));
        }
        Ok(())
    }

    pub async fn list_assignments(
        &self,
        property_id: i64,
    ) -> Result<Vec<PropertyCleaner>, StayError> {
        let rows = sqlx::query_as::<_, PropertyCleaner>(
            r#"SELECT id, property_id, cleaner_id, is_active, assigned_at, created_at, updated_at
               FROM property_cleaners WHERE property_id = ? ORDER BY assigned_at, id"#,
        )
        .bind(property_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Cleaners with an active assignment to the property who are themselves active.
    pub async fn active_cleaners(&self, property_id: i64) -> Result<Vec<Cleaner>, StayError> {
        let rows = sqlx::query_as::<_, Cleaner>(
            r#"SELECT c.id, c.user_id, c.name, c.email, c.phone, c.is_active,
               c.created_at, c.updated_at
               FROM cleaners c
               JOIN property_cleaners pc ON pc.cleaner_id = c.id
               WHERE pc.property_id = ? AND pc.is_active = 1 AND c.is_active = 1
               ORDER BY pc.assigned_at, c.id"#,
        )
        .bind(property_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
