//! Filesystem-backed configuration loading.
//!
//! Pure parsing lives in `domain::config`.

mod load_config;

pub use load_config::load_tool_config;
