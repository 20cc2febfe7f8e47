/// Validates a module name.
///
/// Module names become both a directory under `terraform/` and a module
/// label in `main.tf`, so they must be safe path components.
///
/// Checks:
/// - Non-empty
/// - No path separators (/, \) or null bytes
/// - Not "." or ".."
/// - Characters are ASCII alphanumeric, '-', or '_'
pub fn validate_module_name(name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    if name.contains('/') || name.contains('\\') || name.contains('\0') {
        return false;
    }
    if name == "." || name == ".." {
        return false;
    }
    name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
