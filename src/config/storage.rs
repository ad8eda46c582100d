use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Artwork storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory holding the PNG files, created on startup if missing.
    /// TOML: `storage.art_dir`. Default: `art`.
    #[serde(default = "default_art_dir")]
    pub art_dir: PathBuf,

    /// Listing size used when the request carries no `limit`.
    /// TOML: `storage.default_list_limit`. Default: `100`.
    #[serde(default = "default_list_limit")]
    pub default_list_limit: u32,

    /// Upper bound for `limit`; larger requests are clamped.
    /// TOML: `storage.max_list_limit`. Default: `1000`.
    #[serde(default = "default_max_list_limit")]
    pub max_list_limit: u32,

    /// Maximum accepted request body size for uploads, in bytes.
    /// TOML: `storage.max_upload_bytes`. Default: 10 MiB.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Compare rows against the artwork directory once at startup and log drift.
    /// TOML: `storage.reconcile_on_startup`. Default: `true`.
    #[serde(default = "default_reconcile_on_startup")]
    pub reconcile_on_startup: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            art_dir: default_art_dir(),
            default_list_limit: default_list_limit(),
            max_list_limit: default_max_list_limit(),
            max_upload_bytes: default_max_upload_bytes(),
            reconcile_on_startup: default_reconcile_on_startup(),
        }
    }
}

fn default_art_dir() -> PathBuf {
    PathBuf::from("art")
}

fn default_list_limit() -> u32 {
    100
}

fn default_max_list_limit() -> u32 {
    1000
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_reconcile_on_startup() -> bool {
    true
}
