//! Database module: row models, introspection and the per-entity stores.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows and the enumerated column types
//! - `introspect.rs`: structural snapshot of the live schema
//! - one store per aggregate (`properties.rs`, `bookings.rs`, `guests.rs`, ...)
//!
//! The tables themselves are created by [`crate::migrate`].

pub mod bookings;
pub mod email_templates;
pub mod guests;
pub mod introspect;
pub mod lock_pins;
pub mod models;
pub mod properties;
pub mod reviews;

pub use bookings::BookingStore;
pub use email_templates::EmailTemplateStore;
pub use guests::GuestStore;
pub use introspect::SchemaSnapshot;
pub use lock_pins::LockPinStore;
pub use properties::PropertyStore;
pub use reviews::ReviewStore;

use crate::config::Config;
use crate::error::StayError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;

pub type SqlitePool = Pool<Sqlite>;

/// Open a pool for `cfg.database_url` with foreign keys enforced.
pub async fn connect(cfg: &Config) -> Result<SqlitePool, StayError> {
    let connect_opts = SqliteConnectOptions::from_str(&cfg.database_url)?
        .create_if_missing(cfg.create_if_missing)
        .foreign_keys(true)
        .busy_timeout(cfg.busy_timeout());

    // Every connection to `:memory:` is its own database.
    let max_connections = if cfg.database_url.contains(":memory:") {
        1
    } else {
        5
    };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(connect_opts)
        .await?;
    Ok(pool)
}
