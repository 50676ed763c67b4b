pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod migrate;
pub mod service;
pub mod types;

pub use error::StayError;
pub use migrate::Migrator;
