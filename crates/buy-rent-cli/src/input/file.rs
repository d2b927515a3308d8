use buy_rent_core::BuyRentError;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Read a scenario file as a generic value. `.yaml` / `.yml` files are parsed
/// as YAML, everything else as JSON.
pub fn read_value(path: &str) -> Result<Value, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;

    let value: Value = if is_yaml(&canonical) {
        serde_yaml::from_str(&contents).map_err(|e| parse_error(&canonical, e))?
    } else {
        serde_json::from_str(&contents).map_err(|e| parse_error(&canonical, e))?
    };
    Ok(value)
}

fn parse_error(path: &Path, e: impl std::fmt::Display) -> BuyRentError {
    BuyRentError::SerializationError(format!("Failed to parse '{}': {}", path.display(), e))
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Resolve the path against the working directory and check it is a file.
fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let canonical = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !canonical.exists() {
        return Err(format!("File not found: {}", canonical.display()).into());
    }

    if !canonical.is_file() {
        return Err(format!("Not a file: {}", canonical.display()).into());
    }

    Ok(canonical)
}
