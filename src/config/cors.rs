use serde::{Deserialize, Serialize};

/// Cross-origin configuration for browser clients.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
    /// Allowed origins. `"*"` allows any origin; an empty list disables the CORS layer.
    /// TOML: `cors.allow_origins`. Default: `["*"]`.
    #[serde(default = "default_allow_origins")]
    pub allow_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origins: default_allow_origins(),
        }
    }
}

impl CorsConfig {
    pub fn allows_any_origin(&self) -> bool {
        self.allow_origins.iter().any(|o| o.trim() == "*")
    }
}

fn default_allow_origins() -> Vec<String> {
    vec!["*".to_string()]
}
