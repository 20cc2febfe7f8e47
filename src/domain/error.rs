use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::template::TemplateError;

/// Library-wide error type for tfmart operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Configuration or environment issue.
    #[error("{0}")]
    Configuration(String),

    /// Package could not be retrieved.
    #[error("Failed to fetch package '{url}': {details}")]
    Network { url: String, details: String },

    /// Package archive is corrupt, truncated, or unsafe to extract.
    #[error("Invalid package archive for module '{module}': {details}")]
    Archive { module: String, details: String },

    /// Directory or file create, write, or delete failure.
    #[error("Filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Template parsing or rendering failed.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Module name cannot be used as a directory or module label.
    #[error("Invalid module name '{0}': must be alphanumeric with hyphens or underscores")]
    InvalidModuleName(String),

    /// Two modules of one workspace share a name.
    #[error("Duplicate module name '{0}' in workspace")]
    DuplicateModule(String),

    /// A dependency references a module that is not part of the workspace.
    #[error(
        "Module '{module}' wires variable '{variable}' to unknown module '{dependency}'"
    )]
    UnresolvedDependency { module: String, variable: String, dependency: String },

    /// No installation for the requested repository.
    #[error("Installation for repository '{0}' not found")]
    InstallationNotFound(String),

    /// Parse error.
    #[error("Failed to parse {what}: {details}")]
    ParseError { what: String, details: String },

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),
}

impl AppError {
    pub fn config_error<S: Into<String>>(message: S) -> Self {
        AppError::Configuration(message.into())
    }

    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: io::Error) -> Self {
        AppError::Filesystem { path: path.into(), source }
    }

    /// Provide an `io::ErrorKind`-like view for callers expecting legacy behavior.
    pub fn kind(&self) -> io::ErrorKind {
        match self {
            AppError::Io(err) => err.kind(),
            AppError::Filesystem { source, .. } => source.kind(),
            AppError::Configuration(_)
            | AppError::Template(_)
            | AppError::InvalidModuleName(_)
            | AppError::UnresolvedDependency { .. }
            | AppError::ParseError { .. }
            | AppError::TomlParseError(_) => io::ErrorKind::InvalidInput,
            AppError::Archive { .. } => io::ErrorKind::InvalidData,
            AppError::DuplicateModule(_) => io::ErrorKind::AlreadyExists,
            AppError::InstallationNotFound(_) => io::ErrorKind::NotFound,
            AppError::Network { .. } => io::ErrorKind::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filesystem_error_reports_path_and_kind() {
        let err = AppError::filesystem(
            "/tmp/ws/terraform/main.tf",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        assert!(err.to_string().contains("/tmp/ws/terraform/main.tf"));
    }

    #[test]
    fn configuration_errors_are_invalid_input() {
        let err = AppError::UnresolvedDependency {
            module: "app".into(),
            variable: "vpc_id".into(),
            dependency: "network".into(),
        };
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(err.to_string().contains("'network'"));
    }
}
