use super::SqlitePool;
use super::models::{EmailTemplate, TemplateType};
use crate::error::StayError;
use crate::types::AvailableVariables;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

const SELECT_TEMPLATE: &str = r#"SELECT id, property_id, name, template_type, subject, html_body,
    text_body, days_before_check_in, days_after_check_out, is_active, include_lock_pin,
    available_variables, created_at, updated_at
    FROM email_templates"#;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEmailTemplate {
    pub property_id: i64,
    pub name: String,
    pub template_type: TemplateType,
    pub subject: String,
    pub html_body: String,
    pub text_body: Option<String>,
    pub days_before_check_in: Option<i64>,
    pub days_after_check_out: Option<i64>,
    pub include_lock_pin: bool,
    /// Column default applies when omitted.
    pub available_variables: Option<AvailableVariables>,
}

#[derive(Clone)]
pub struct EmailTemplateStore {
    pool: SqlitePool,
}

impl EmailTemplateStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn create(&self, new: NewEmailTemplate) -> Result<i64, StayError> {
        let variables_json = new
            .available_variables
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        // Leave the column out entirely so its default applies.
        let (variables_col, variables_val) = match variables_json {
            Some(_) => (", available_variables", ", ?"),
            None => ("", ""),
        };
        let sql = format!(
            "INSERT INTO email_templates (
                property_id, name, template_type, subject, html_body, text_body,
                days_before_check_in, days_after_check_out, include_lock_pin{variables_col}
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?{variables_val})"
        );
        let mut query = sqlx::query(&sql)
            .bind(new.property_id)
            .bind(new.name)
            .bind(new.template_type)
            .bind(new.subject)
            .bind(new.html_body)
            .bind(new.text_body)
            .bind(new.days_before_check_in)
            .bind(new.days_after_check_out)
            .bind(new.include_lock_pin);
        if let Some(json) = variables_json {
            query = query.bind(json);
        }
        let id = query.execute(&self.pool).await?.last_insert_rowid();
        Ok(id)
    }

    pub async fn get(&self, id: i64) -> Result<EmailTemplate, StayError> {
        let sql = format!("{SELECT_TEMPLATE} WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StayError::not_found("email template", id))?;
        Self::row_to_model(row)
    }

    pub async fn list_for_property(
        &self,
        property_id: i64,
    ) -> Result<Vec<EmailTemplate>, StayError> {
        let sql = format!("{SELECT_TEMPLATE} WHERE property_id = ? ORDER BY template_type, id");
        let rows = sqlx::query(&sql)
            .bind(property_id)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Self::row_to_model).collect()
    }

    /// Newest active template of a type for the property.
    pub async fn find_active(
        &self,
        property_id: i64,
        template_type: TemplateType,
    ) -> Result<Option<EmailTemplate>, StayError> {
        let sql = format!(
            "{SELECT_TEMPLATE} WHERE property_id = ? AND template_type = ? AND is_active = 1 \
             ORDER BY id DESC LIMIT 1"
        );
        sqlx::query(&sql)
            .bind(property_id)
            .bind(template_type)
            .fetch_optional(&self.pool)
            .await?
            .map(Self::row_to_model)
            .transpose()
    }

    pub async fn set_active(&self, id: i64, active: bool) -> Result<(), StayError> {
        let updated =
            sqlx::query("UPDATE email_templates SET is_active = ?, updated_at = ? WHERE id = ?")
                .bind(active)
                .bind(Utc::now())
                .bind(id)
                .execute(&self.pool)
                .await?
                .rows_affected();
        if updated == 0 {
            return Err(StayError::not_found("email template", id));
        }
        Ok(())
    }

    fn row_to_model(row: SqliteRow) -> Result<EmailTemplate, StayError> {
        let variables_json: String = row.try_get("available_variables")?;

        Ok(EmailTemplate {
            id: row.try_get("id")?,
            property_id: row.try_get("property_id")?,
            name: row.try_get("name")?,
            template_type: row.try_get("template_type")?,
            subject: row.try_get("subject")?,
            html_body: row.try_get("html_body")?,
            text_body: row.try_get("text_body")?,
            days_before_check_in: row.try_get("days_before_check_in")?,
            days_after_check_out: row.try_get("days_after_check_out")?,
            is_active: row.try_get("is_active")?,
            include_lock_pin: row.try_get("include_lock_pin")?,
            available_variables: serde_json::from_str(&variables_json)?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}
