pub mod build;
pub mod template;
