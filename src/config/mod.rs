mod basic;
mod cors;
mod storage;

pub use basic::BasicConfig;
pub use cors::CorsConfig;
pub use storage::StorageConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Core server configuration (see `basic` table in config.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// Artwork directory and listing limits (see `storage` table in config.toml).
    #[serde(default)]
    pub storage: StorageConfig,

    /// Cross-origin settings (see `cors` table in config.toml).
    #[serde(default)]
    pub cors: CorsConfig,
}

const DEFAULT_CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "PANTRY_";

impl Config {
    /// Builds a Figment that merges defaults, an optional config TOML file and
    /// `PANTRY_`-prefixed environment variables (`__` separates tables).
    pub fn figment() -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            figment = figment.merge(Toml::file(DEFAULT_CONFIG_FILE));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Loads and validates configuration.
    pub fn load() -> Result<Self, figment::Error> {
        let cfg: Self = Self::figment().extract()?;
        cfg.validate()
            .map_err(|msg| figment::Error::from(msg.to_string()))?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        if self.storage.default_list_limit == 0 {
            return Err("storage.default_list_limit must be positive");
        }
        if self.storage.max_list_limit < self.storage.default_list_limit {
            return Err("storage.max_list_limit must not be below storage.default_list_limit");
        }
        Ok(())
    }
}
