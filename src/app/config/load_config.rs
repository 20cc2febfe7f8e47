//! Tool configuration loading (`tfmart.toml`).

use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::domain::config::{self, CONFIG_FILENAME};
use crate::domain::{AppError, ToolConfig};

/// Load tool configuration.
///
/// An explicit path must exist. Without one, `tfmart.toml` in `cwd` is used
/// when present and defaults apply otherwise.
pub fn load_tool_config(explicit: Option<&Path>, cwd: &Path) -> Result<ToolConfig, AppError> {
    if let Some(path) = explicit {
        let content = fs::read_to_string(path).map_err(|err| {
            if err.kind() == io::ErrorKind::NotFound {
                AppError::config_error(format!("Config file not found: {}", path.display()))
            } else {
                AppError::filesystem(path, err)
            }
        })?;
        debug!(path = %path.display(), "loaded tool config");
        return config::parse::parse_config_content(&content);
    }

    let implicit = cwd.join(CONFIG_FILENAME);
    match fs::read_to_string(&implicit) {
        Ok(content) => {
            debug!(path = %implicit.display(), "loaded tool config");
            config::parse::parse_config_content(&content)
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(ToolConfig::default()),
        Err(err) => Err(AppError::filesystem(implicit, err)),
    }
}
