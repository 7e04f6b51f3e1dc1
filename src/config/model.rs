//! Configuration data structures
//!
//! This module contains the data structures for configuration.

use std::time::Duration;

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_API_URL, DEFAULT_AUTH_TIMEOUT_SECS, DEFAULT_EXTRACTION_APPROVAL_SCORE,
    DEFAULT_FACE_MATCH_THRESHOLD, DEFAULT_REQUEST_TIMEOUT_SECS,
};

/// Configuration for the CNH validator
///
/// Every section is optional; a missing file yields the defaults.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    /// Access to the mostQI document API
    pub mostqi: MostQiConfig,
    /// Appearance and callbacks of the liveness session
    pub liveness: LivenessConfig,
    /// Approval thresholds
    pub thresholds: Thresholds,
}

/// Connection settings for the mostQI API
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct MostQiConfig {
    /// Root URL of the API, without trailing slash
    pub base_url: String,
    /// Client key exchanged for a JWT; `$VAR` references are expanded
    pub client_key: Option<String>,
    /// Timeout for processing requests, in seconds
    pub request_timeout_secs: u64,
    /// Timeout for authentication requests, in seconds
    pub auth_timeout_secs: u64,
}

impl Default for MostQiConfig {
    fn default() -> Self {
        MostQiConfig {
            base_url: DEFAULT_API_URL.to_string(),
            client_key: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            auth_timeout_secs: DEFAULT_AUTH_TIMEOUT_SECS,
        }
    }
}

impl MostQiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn auth_timeout(&self) -> Duration {
        Duration::from_secs(self.auth_timeout_secs)
    }
}

/// Liveness session customisation
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LivenessConfig {
    /// Webhook the API calls when the session finishes
    pub webhook_url: Option<String>,
    /// `GET ?url=` service shortening the session link; unset keeps the full link
    pub shortener_url: Option<String>,
    /// Page the operator lands on after the session
    pub redirect_url: String,
    pub default_language: String,
    pub theme: String,
    pub primary_color: String,
    pub hide_topbar: bool,
}

impl Default for LivenessConfig {
    fn default() -> Self {
        LivenessConfig {
            webhook_url: None,
            shortener_url: None,
            redirect_url: "https://most.com.br/".to_string(),
            default_language: "pt-BR".to_string(),
            theme: "dark".to_string(),
            primary_color: "#820AD1".to_string(),
            hide_topbar: true,
        }
    }
}

/// Thresholds deciding approval
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Thresholds {
    /// Extraction score above which a CNH image is approved
    pub extraction_score: f64,
    /// Facial similarity from which two faces match
    pub face_match: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            extraction_score: DEFAULT_EXTRACTION_APPROVAL_SCORE,
            face_match: DEFAULT_FACE_MATCH_THRESHOLD,
        }
    }
}

impl Config {
    /// Validates the configuration
    ///
    /// # Errors
    /// Returns an error with a detailed message if validation fails
    pub fn validate(&self) -> Result<()> {
        let base_url = self.mostqi.base_url.trim();
        if base_url.is_empty() {
            return Err(anyhow!(
                "No mostQI base URL specified in configuration. Set `mostqi.base_url`."
            ));
        }

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(anyhow!(
                "mostQI base URL must start with http:// or https://: {}",
                base_url
            ));
        }

        if let Some(shortener) = &self.liveness.shortener_url {
            let shortener = shortener.trim();
            if !shortener.is_empty()
                && !shortener.starts_with("http://")
                && !shortener.starts_with("https://")
            {
                return Err(anyhow!(
                    "Link shortener URL must start with http:// or https://: {}",
                    shortener
                ));
            }
        }

        if self.mostqi.request_timeout_secs == 0 || self.mostqi.auth_timeout_secs == 0 {
            return Err(anyhow!(
                "Request timeouts must be at least one second. Please check the `mostqi` section."
            ));
        }

        for (name, value) in [
            ("extraction_score", self.thresholds.extraction_score),
            ("face_match", self.thresholds.face_match),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(anyhow!(
                    "Threshold '{}' must be between 0 and 1, got {}.",
                    name,
                    value
                ));
            }
        }

        Ok(())
    }

    /// The configured client key, if it is set and not empty
    pub fn client_key(&self) -> Option<&str> {
        self.mostqi
            .client_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.mostqi.base_url, "https://mostqiapi.com");
        assert_eq!(config.mostqi.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.mostqi.auth_timeout(), Duration::from_secs(10));
        assert_eq!(config.thresholds.face_match, 0.70);
    }

    #[test]
    fn test_rejects_out_of_range_threshold() {
        let mut config = Config::default();
        config.thresholds.face_match = 1.5;
        let error = config.validate().unwrap_err();
        assert!(error.to_string().contains("face_match"));
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let mut config = Config::default();
        config.mostqi.base_url = "ftp://mostqiapi.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_non_http_shortener() {
        let mut config = Config::default();
        config.liveness.shortener_url = Some("tinyurl.com/api-create.php".to_string());
        let error = config.validate().unwrap_err();
        assert!(error.to_string().contains("shortener"));

        config.liveness.shortener_url = Some("https://tinyurl.com/api-create.php".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_client_key_is_none() {
        let mut config = Config::default();
        config.mostqi.client_key = Some("  ".to_string());
        assert!(config.client_key().is_none());
        config.mostqi.client_key = Some("abc".to_string());
        assert_eq!(config.client_key(), Some("abc"));
    }
}
