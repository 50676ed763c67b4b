use crate::types::AvailableVariables;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Declares a text-backed enum with its column spelling in one place.
macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
        #[serde(rename_all = "snake_case")]
        #[sqlx(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!("unknown {}: {other}", stringify!($name))),
                }
            }
        }
    };
}

text_enum!(
    /// Values of `user_role_values`; `Cleaner` exists once the role extension is applied.
    UserRole {
        Admin => "admin",
        Owner => "owner",
        Manager => "manager",
        Cleaner => "cleaner",
    }
);

text_enum!(BookingStatus {
    Pending => "pending",
    Confirmed => "confirmed",
    CheckedIn => "checked_in",
    CheckedOut => "checked_out",
    Cancelled => "cancelled",
});

text_enum!(TemplateType {
    PreStay => "pre_stay",
    PostStay => "post_stay",
    BookingConfirmation => "booking_confirmation",
    Custom => "custom",
});

text_enum!(ContactType {
    Owner => "owner",
    Guest => "guest",
});

text_enum!(
    /// Where a review was collected.
    ReviewPlatform {
        Direct => "direct",
        Airbnb => "airbnb",
        Vrbo => "vrbo",
        BookingCom => "booking_com",
        Other => "other",
    }
);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct Property {
    pub id: i64,
    pub owner_id: Option<i64>,
    pub name: String,
    pub address: Option<String>,
    pub timezone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct Cleaner {
    pub id: i64,
    pub user_id: Option<i64>,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct Booking {
    pub id: i64,
    pub property_id: i64,
    pub guest_name: String,
    pub guest_email: Option<String>,
    pub guest_phone: Option<String>,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub guest_count: i64,
    pub total_amount: Option<f64>,
    pub status: BookingStatus,
    /// PIN text handed to the guest; survives deletion of the pin row.
    pub assigned_lock_pin: Option<String>,
    pub lock_pin_id: Option<i64>,
    pub pre_stay_email_sent_at: Option<DateTime<Utc>>,
    pub post_stay_email_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn nights(&self) -> i64 {
        (self.check_out_date - self.check_in_date).num_days()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Guest {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub total_stays: i64,
    pub total_spent: f64,
    pub first_stay_at: Option<DateTime<Utc>>,
    pub last_stay_at: Option<DateTime<Utc>>,
    pub preferences: Map<String, Value>,
    pub marketing_opt_in: bool,
    pub tags: BTreeSet<String>,
    pub notes: Option<String>,
    pub is_blacklisted: bool,
    pub blacklist_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct GuestStay {
    pub id: i64,
    pub guest_id: i64,
    pub property_id: i64,
    pub booking_id: i64,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub nights: i64,
    pub guest_count: i64,
    pub total_amount: Option<f64>,
    pub rating: Option<i64>,
    pub review: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct LockPin {
    pub id: i64,
    pub property_id: i64,
    pub pin: String,
    pub label: Option<String>,
    pub order_index: i64,
    pub is_active: bool,
    pub last_used_at: Option<DateTime<Utc>>,
    pub usage_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct PropertySettings {
    pub id: i64,
    pub property_id: i64,
    pub pin_rotation_enabled: bool,
    pub current_pin_index: i64,
    pub pre_stay_email_enabled: bool,
    pub pre_stay_email_days: i64,
    pub post_stay_email_enabled: bool,
    pub post_stay_email_days: i64,
    pub wifi_name: Option<String>,
    pub wifi_password: Option<String>,
    pub house_rules: Option<String>,
    pub check_in_instructions: Option<String>,
    pub check_out_instructions: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct PropertyContact {
    pub id: i64,
    pub property_id: i64,
    pub contact_type: ContactType,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_primary: bool,
    pub receive_notifications: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct PropertyCleaner {
    pub id: i64,
    pub property_id: i64,
    pub cleaner_id: i64,
    pub is_active: bool,
    pub assigned_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmailTemplate {
    pub id: i64,
    pub property_id: i64,
    pub name: String,
    pub template_type: TemplateType,
    pub subject: String,
    pub html_body: String,
    pub text_body: Option<String>,
    pub days_before_check_in: Option<i64>,
    pub days_after_check_out: Option<i64>,
    pub is_active: bool,
    pub include_lock_pin: bool,
    pub available_variables: AvailableVariables,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct Review {
    pub id: i64,
    pub property_id: i64,
    pub booking_id: Option<i64>,
    pub guest_id: Option<i64>,
    pub reviewer_name: Option<String>,
    pub overall_rating: i64,
    pub cleanliness_rating: Option<i64>,
    pub communication_rating: Option<i64>,
    pub check_in_rating: Option<i64>,
    pub accuracy_rating: Option<i64>,
    pub location_rating: Option<i64>,
    pub value_rating: Option<i64>,
    pub review_text: Option<String>,
    pub platform: ReviewPlatform,
    pub external_review_id: Option<String>,
    pub is_verified: bool,
    pub is_published: bool,
    pub owner_response: Option<String>,
    pub owner_responded_at: Option<DateTime<Utc>>,
    pub review_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
