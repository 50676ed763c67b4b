//! Runtime configuration, layered with figment:
//! defaults, then `stayops.toml`, then `STAYOPS_*` environment variables.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const CONFIG_FILE: &str = "stayops.toml";
pub const ENV_PREFIX: &str = "STAYOPS_";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub database_url: String,
    pub loglevel: String,
    pub create_if_missing: bool,
    pub busy_timeout_secs: u64,
    /// Label written into the migration lock row while a run is active.
    pub lock_holder: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:stayops.sqlite".to_string(),
            loglevel: "info".to_string(),
            create_if_missing: true,
            busy_timeout_secs: 5,
            lock_holder: format!("stayops-{}", std::process::id()),
        }
    }
}

impl Config {
    /// Base figment without any file or environment layer.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
    }

    pub fn load() -> Result<Self, figment::Error> {
        Self::figment()
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_secs(self.busy_timeout_secs)
    }
}
