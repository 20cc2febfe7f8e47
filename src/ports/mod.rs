mod installation_source;
mod package_fetcher;
mod workspace_store;

pub use installation_source::InstallationSource;
pub use package_fetcher::PackageFetcher;
pub use workspace_store::WorkspaceStore;
