use std::fs::create_dir_all;

use directories::ProjectDirs;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::constants::{APPLICATION, ORGANIZATION, QUALIFIER};
use crate::errors::{file_operation_error, generic_error, Result};

/// Helper method to remove a `data:<mime>;base64,` prefix from a string
pub fn strip_data_uri(content: &str) -> &str {
    static DATA_URI_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^data:.*?;base64,").expect("Failed to compile regex pattern for strip_data_uri")
    });

    let trimmed = content.trim();
    match DATA_URI_RE.find(trimmed) {
        Some(prefix) => &trimmed[prefix.end()..],
        None => trimmed,
    }
}

/// Round a value to two decimal places
///
/// Ties are resolved on the exact binary value, half to even, so `2.675`
/// (stored as `2.67499…`) gives `2.67` and `0.125` gives `0.12`.
pub fn round2(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

/// Text of a JSON value for embedding in Markdown, `None` for null
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

pub(crate) fn find_project_folder() -> Result<ProjectDirs> {
    let folder = ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
        .ok_or_else(|| generic_error("Failed to determine project directories"))?;

    let config_dir = folder.config_dir();
    if !config_dir.exists() {
        create_dir_all(config_dir)
            .map_err(|e| file_operation_error(e, config_dir.to_path_buf(), "create"))?;
    }
    Ok(folder)
}
