pub mod validation;

pub use validation::validate_module_name;
