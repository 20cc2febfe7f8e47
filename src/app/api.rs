//! API Facade for the application.
//!
//! This module exposes high-level functions that glue together context creation
//! and command execution.

use std::path::{Path, PathBuf};

use crate::adapters::{FilesystemWorkspaceStore, HttpPackageFetcher, ManifestInstallationSource};
use crate::app::{AppContext, commands, config};
use crate::domain::{TemplateRenderer, ToolConfig, Workspace};
use crate::ports::InstallationSource;

pub use crate::app::commands::build::BuildOutcome;
pub use crate::domain::AppError;

/// Default manifest file name, resolved against the working directory.
pub const DEFAULT_MANIFEST: &str = "tfmart.yml";

/// Inputs of a build run.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Repository name of the installation to build.
    pub repository: String,
    /// Installation manifest.
    pub manifest: PathBuf,
    /// Directory the workspace is created under.
    pub base_dir: PathBuf,
    /// Explicit tool configuration file.
    pub config: Option<PathBuf>,
}

impl BuildOptions {
    /// Options with the default manifest, rooted at `base_dir`.
    pub fn new(repository: impl Into<String>, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            repository: repository.into(),
            manifest: PathBuf::from(DEFAULT_MANIFEST),
            base_dir: base_dir.into(),
            config: None,
        }
    }
}

/// Build the workspace of one installation.
pub fn build(options: &BuildOptions) -> Result<BuildOutcome, AppError> {
    let cwd = std::env::current_dir()?;
    let config = config::load_tool_config(options.config.as_deref(), &cwd)?;
    let source = ManifestInstallationSource::from_path(&options.manifest)?;
    build_with(&source, &options.repository, &options.base_dir, config)
}

/// Build the workspace of `repository` from an arbitrary installation source.
pub fn build_with<I: InstallationSource>(
    source: &I,
    repository: &str,
    base_dir: &Path,
    config: ToolConfig,
) -> Result<BuildOutcome, AppError> {
    let package = source.installation(repository)?;
    let workspace = Workspace::new(base_dir, package)?;

    let fetcher = HttpPackageFetcher::new(&config.fetch)?;
    let ctx = AppContext::new(FilesystemWorkspaceStore::new(), fetcher, config);
    commands::build::execute(&ctx, &workspace)
}

/// Render `template` against the context of the installation of `repository`.
pub fn render_template(manifest: &Path, repository: &str, template: &str) -> Result<String, AppError> {
    let source = ManifestInstallationSource::from_path(manifest)?;
    let package = source.installation(repository)?;
    commands::template::execute(&TemplateRenderer::new(), &package.installation, template)
}
