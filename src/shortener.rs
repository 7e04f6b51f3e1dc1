//! Link shortening
//!
//! Liveness session links are long and get typed into a phone browser by the
//! operator, so they are shortened when a shortener endpoint is configured.

use std::time::Duration;

use log::{debug, error, info};
use reqwest::Client;

use crate::config::Config;
use crate::constants::USER_AGENT;
use crate::errors::{Result, api_error, generic_error, http_error, invalid_input_error};

/// Client for a `GET <endpoint>?url=<link>` shortening service
#[derive(Debug, Clone)]
pub struct LinkShortener {
    http: Client,
    /// Service answering with the short link as plain text; `None` keeps links as they are
    endpoint: Option<String>,
    timeout: Duration,
}

impl LinkShortener {
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built
    pub fn new(endpoint: Option<&str>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| http_error(e, "build HTTP client"))?;

        Ok(LinkShortener {
            http,
            endpoint: endpoint
                .map(str::trim)
                .filter(|endpoint| !endpoint.is_empty())
                .map(str::to_string),
            timeout,
        })
    }

    /// Creates a shortener from `liveness.shortener_url`
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built
    pub fn from_config(config: &Config) -> Result<Self> {
        LinkShortener::new(
            config.liveness.shortener_url.as_deref(),
            config.mostqi.request_timeout(),
        )
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// Shortens `link`, or returns it unchanged when no endpoint is configured
    ///
    /// # Errors
    /// Returns an invalid input error for an empty link, an API error for any
    /// non-success status and an HTTP error on transport failure
    pub async fn shorten(&self, link: &str) -> Result<String> {
        let link = link.trim();
        if link.is_empty() {
            return Err(invalid_input_error("session_url", "must not be empty"));
        }

        let Some(endpoint) = &self.endpoint else {
            debug!("No shortener configured, keeping {link}");
            return Ok(link.to_string());
        };

        let response = self
            .http
            .get(endpoint)
            .query(&[("url", link)])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| http_error(e, "shorten link"))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| http_error(e, "read shortened link"))?;
        if !status.is_success() {
            error!("Shortener answered {}: {}", status.as_u16(), body);
            return Err(api_error(status.as_u16(), &body));
        }

        let short = body.trim();
        if short.is_empty() {
            return Err(generic_error("Shortener returned an empty link"));
        }
        info!("Session link shortened to {short}");
        Ok(short.to_string())
    }
}
