//! Configuration loading functionality
//!
//! This module contains functions for locating, loading and validating configuration.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use log::{debug, info};
use serde_yaml::from_str;

use crate::utils::find_project_folder;

use super::model::Config;

/// Loads a configuration from a file
///
/// `$VAR` and `~` references in the client key and the URLs are expanded.
///
/// # Errors
/// Returns an error if the file cannot be read or if the configuration is invalid
pub fn load_config(file: &Path) -> Result<Config> {
    let file_content = fs::read(file).map_err(|e| {
        anyhow!(
            "Failed to read configuration file {}: {}",
            file.display(),
            e
        )
    })?;

    let content_str = String::from_utf8(file_content).map_err(|e| {
        anyhow!(
            "Configuration file {} contains invalid UTF-8 characters: {}",
            file.display(),
            e
        )
    })?;

    let mut config = parse_config(&content_str).map_err(|e| {
        anyhow!(
            "Failed to parse configuration file {}: {}\nPlease check the YAML syntax.",
            file.display(),
            e
        )
    })?;

    expand_config(&mut config);
    config.validate()?;

    debug!("Configuration loaded from {}", file.display());
    Ok(config)
}

/// Parses configuration YAML without validating it
pub fn parse_config(content: &str) -> Result<Config> {
    if content.trim().is_empty() {
        return Ok(Config::default());
    }
    Ok(from_str(content)?)
}

/// Resolves and loads the configuration to use
///
/// The given path wins when it exists; otherwise the same file name is looked up
/// in the platform configuration directory. When neither exists the defaults
/// are used.
///
/// # Errors
/// Returns an error if an existing file cannot be loaded
pub fn load_or_default(config: PathBuf) -> Result<Config> {
    match locate_config(config)? {
        Some(path) => load_config(&path),
        None => {
            info!("No configuration file found, using defaults");
            let mut config = Config::default();
            expand_config(&mut config);
            Ok(config)
        }
    }
}

/// Finds the configuration file, if any
///
/// # Errors
/// Returns an error if the configuration directory cannot be determined
pub fn locate_config(config: PathBuf) -> Result<Option<PathBuf>> {
    if config.exists() {
        return Ok(Some(config));
    }

    let folder = find_project_folder()?;
    let fallback = folder.config_dir().join(&config);
    if fallback.exists() {
        Ok(Some(fallback))
    } else {
        debug!(
            "Configuration file not found at {} or {}",
            config.display(),
            fallback.display()
        );
        Ok(None)
    }
}

/// Expands `~` and environment variables, leaving unknown variables untouched
pub fn expand_value(value: &str) -> String {
    match shellexpand::full(value) {
        Ok(expanded) => expanded.to_string(),
        Err(_) => shellexpand::tilde(value).to_string(),
    }
}

fn expand_config(config: &mut Config) {
    config.mostqi.base_url = expand_value(&config.mostqi.base_url)
        .trim_end_matches('/')
        .to_string();
    if let Some(key) = &config.mostqi.client_key {
        config.mostqi.client_key = Some(expand_value(key));
    }
    if let Some(webhook) = &config.liveness.webhook_url {
        config.liveness.webhook_url = Some(expand_value(webhook));
    }
    if let Some(shortener) = &config.liveness.shortener_url {
        config.liveness.shortener_url = Some(expand_value(shortener));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_config_gives_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_parse_partial_config() {
        let config = parse_config(
            r#"
thresholds:
  face_match: 0.9
"#,
        )
        .unwrap();
        assert_eq!(config.thresholds.face_match, 0.9);
        assert_eq!(config.thresholds.extraction_score, 0.8);
        assert_eq!(config.mostqi.base_url, "https://mostqiapi.com");
    }

    #[test]
    fn test_expand_value_keeps_unknown_variable() {
        assert_eq!(
            expand_value("$CNH_VALIDATOR_SURELY_UNSET_VAR"),
            "$CNH_VALIDATOR_SURELY_UNSET_VAR"
        );
    }
}
