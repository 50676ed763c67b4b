#![allow(dead_code)]

use chrono::NaiveDate;
use stayops::Migrator;
use stayops::config::Config;
use stayops::db::bookings::NewBooking;
use stayops::db::models::{BookingStatus, UserRole};
use stayops::db::properties::NewProperty;
use stayops::db::{BookingStore, PropertyStore, SqlitePool};
use std::time::{SystemTime, UNIX_EPOCH};

/// `sqlite:` URL of a database file in the temp dir that does not exist yet.
pub fn temp_database_url(tag: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut temp_path = std::env::temp_dir();
    temp_path.push(format!(
        "stayops-{tag}-{}-{}.sqlite",
        std::process::id(),
        nanos
    ));
    format!("sqlite:{}", temp_path.display())
}

pub async fn open_pool(database_url: &str) -> SqlitePool {
    let cfg = Config {
        database_url: database_url.to_string(),
        ..Config::default()
    };
    stayops::db::connect(&cfg)
        .await
        .expect("temp database should open")
}

/// A fresh database file in the temp dir; nothing is applied yet.
pub async fn empty_pool(tag: &str) -> SqlitePool {
    open_pool(&temp_database_url(tag)).await
}

/// A fresh database with the whole chain applied.
pub async fn migrated_pool(tag: &str) -> SqlitePool {
    let pool = empty_pool(tag).await;
    Migrator::new(pool.clone())
        .up(None)
        .await
        .expect("bundled chain should apply");
    pool
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Owner user plus one property. Returns `(owner_id, property_id)`.
pub async fn seed_property(pool: &SqlitePool, name: &str) -> (i64, i64) {
    let store = PropertyStore::new(pool.clone());
    let email = format!("{}@owners.test", name.to_lowercase().replace(' ', "-"));
    let owner_id = store
        .create_user(&email, "Olive Owner", UserRole::Owner)
        .await
        .expect("owner should insert");
    let property_id = store
        .create_property(NewProperty {
            owner_id: Some(owner_id),
            name: name.to_string(),
            address: Some("12 Quay Street".to_string()),
            timezone: None,
        })
        .await
        .expect("property should insert");
    (owner_id, property_id)
}

pub async fn seed_booking(
    pool: &SqlitePool,
    property_id: i64,
    check_in: NaiveDate,
    check_out: NaiveDate,
) -> i64 {
    BookingStore::new(pool.clone())
        .create(NewBooking {
            property_id,
            guest_name: "Ada Guest".to_string(),
            guest_email: Some("ada@guests.test".to_string()),
            guest_phone: None,
            check_in_date: check_in,
            check_out_date: check_out,
            guest_count: 2,
            total_amount: Some(300.0),
            status: BookingStatus::Confirmed,
        })
        .await
        .expect("booking should insert")
}
