use crate::domain::{TemplateRenderer, ToolConfig};
use crate::ports::{PackageFetcher, WorkspaceStore};

/// Application context holding dependencies for command execution.
pub struct AppContext<S: WorkspaceStore, F: PackageFetcher> {
    store: S,
    fetcher: F,
    renderer: TemplateRenderer,
    config: ToolConfig,
}

impl<S: WorkspaceStore, F: PackageFetcher> AppContext<S, F> {
    /// Create a new application context.
    pub fn new(store: S, fetcher: F, config: ToolConfig) -> Self {
        Self { store, fetcher, renderer: TemplateRenderer::new(), config }
    }

    /// Get a reference to the workspace store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get a reference to the package fetcher.
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn renderer(&self) -> &TemplateRenderer {
        &self.renderer
    }

    pub fn config(&self) -> &ToolConfig {
        &self.config
    }
}
