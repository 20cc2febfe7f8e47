//! Installation source backed by a local YAML manifest.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::domain::{AppError, InstalledPackage};
use crate::ports::InstallationSource;

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default)]
    installations: Vec<InstalledPackage>,
}

/// Installations listed in a manifest file.
#[derive(Debug, Clone)]
pub struct ManifestInstallationSource {
    installations: Vec<InstalledPackage>,
}

impl ManifestInstallationSource {
    /// Load the manifest at `path`.
    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        let content = fs::read_to_string(path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                AppError::config_error(format!("Manifest not found: {}", path.display()))
            } else {
                AppError::filesystem(path, err)
            }
        })?;
        debug!(path = %path.display(), "loaded installation manifest");
        Self::parse(&content)
    }

    /// Parse manifest YAML content.
    pub fn parse(content: &str) -> Result<Self, AppError> {
        let manifest: Manifest = serde_yaml::from_str(content).map_err(|err| {
            AppError::ParseError { what: "installation manifest".to_string(), details: err.to_string() }
        })?;
        Ok(Self { installations: manifest.installations })
    }
}

impl InstallationSource for ManifestInstallationSource {
    fn installation(&self, repository: &str) -> Result<InstalledPackage, AppError> {
        self.installations
            .iter()
            .find(|package| package.installation.repository.name == repository)
            .cloned()
            .ok_or_else(|| AppError::InstallationNotFound(repository.to_string()))
    }
}
