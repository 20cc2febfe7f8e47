pub mod archive;
pub mod manifest_source;
pub mod package_fetcher_http;
pub mod workspace_filesystem;

pub use manifest_source::ManifestInstallationSource;
pub use package_fetcher_http::HttpPackageFetcher;
pub use workspace_filesystem::FilesystemWorkspaceStore;
