pub mod config;
pub mod error;
pub mod identifiers;
pub mod installation;
pub mod template;
pub mod value;
pub mod workspace;

pub use config::{BuildConfig, FetchConfig, ToolConfig};
pub use error::AppError;
pub use installation::{InstalledPackage, Installation, ModuleSpec, Repository};
pub use template::{TemplateError, TemplateRenderer, values_context};
pub use value::Value;
pub use workspace::Workspace;
