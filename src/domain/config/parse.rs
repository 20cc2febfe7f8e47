//! Pure parse/validate for tool configuration (`tfmart.toml`).

use super::ToolConfig;
use crate::domain::AppError;

/// Parse and validate tool configuration from TOML content.
pub fn parse_config_content(content: &str) -> Result<ToolConfig, AppError> {
    let config: ToolConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}
