//! Tool configuration domain models (`tfmart.toml`).

pub mod parse;

use serde::Deserialize;

use crate::domain::AppError;

/// File name looked up in the current directory when no path is given.
pub const CONFIG_FILENAME: &str = "tfmart.toml";

/// Configuration for assembly runs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolConfig {
    /// Package download settings.
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Assembly settings.
    #[serde(default)]
    pub build: BuildConfig,
}

impl ToolConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.fetch.timeout_secs == 0 {
            return Err(AppError::config_error("fetch.timeout_secs must be greater than zero"));
        }
        if self.fetch.user_agent.trim().is_empty() {
            return Err(AppError::config_error("fetch.user_agent must not be empty"));
        }
        Ok(())
    }
}

/// Package download settings.
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Request timeout in seconds, covering the whole download.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// `User-Agent` header sent with package requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { timeout_secs: default_timeout(), user_agent: default_user_agent() }
    }
}

fn default_timeout() -> u64 {
    60
}

fn default_user_agent() -> String {
    format!("tfmart/{}", env!("CARGO_PKG_VERSION"))
}

/// Assembly settings.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildConfig {
    /// Fail before fetching when a dependency names an unknown module.
    #[serde(default = "default_true")]
    pub validate_dependencies: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self { validate_dependencies: default_true() }
    }
}

fn default_true() -> bool {
    true
}
