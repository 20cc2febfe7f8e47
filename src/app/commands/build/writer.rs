//! Aggregate definition file output.

use std::path::PathBuf;

use tracing::info;

use super::assembler::RenderedModule;
use crate::domain::{AppError, Workspace};
use crate::ports::WorkspaceStore;

/// Join the rendered blocks with one blank line and write `terraform/main.tf`.
///
/// Returns the path written.
pub fn write_aggregate<S: WorkspaceStore>(
    store: &S,
    workspace: &Workspace,
    modules: &[RenderedModule],
) -> Result<PathBuf, AppError> {
    let path = workspace.aggregate_file();
    store.write_file_atomic(&path, &aggregate_content(modules))?;
    info!(path = %path.display(), modules = modules.len(), "wrote aggregate definition");
    Ok(path)
}

fn aggregate_content(modules: &[RenderedModule]) -> String {
    let mut content =
        modules.iter().map(|module| module.text.as_str()).collect::<Vec<_>>().join("\n\n");
    content.push('\n');
    content
}
