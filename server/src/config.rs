use anyhow::Result;
use serde::Deserialize;

/// Application configuration loaded from a TOML file or defaults.
///
/// Collection interval, retention horizon and history ranges are fixed
/// constants in [`crate::metrics`] and deliberately not part of this file.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Directory holding the built dashboard frontend. When set, it is
    /// served for every path that is not an API route.
    #[serde(default)]
    pub static_dir: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            static_dir: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::de::from_str(contents)?;
        Ok(config)
    }
}
