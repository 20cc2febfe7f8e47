//! tfmart: assemble Terraform workspaces from packaged infrastructure modules.
//!
//! For each module an installation requires, the package archive is fetched
//! and unpacked, its configuration is rendered from the installation context,
//! and a wrapper block is emitted into a single aggregate `main.tf`.

pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;

#[cfg(test)]
pub(crate) mod testing;

pub use app::api::{
    BuildOptions, BuildOutcome, DEFAULT_MANIFEST, build, build_with, render_template,
};
pub use domain::{
    AppError, InstalledPackage, Installation, ModuleSpec, Repository, TemplateError,
    TemplateRenderer, ToolConfig, Value, Workspace, values_context,
};
