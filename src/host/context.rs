//! Execution context
//!
//! This module defines the ambient context the host engine hands to every step.

use std::env;

use crate::errors::{host_capability_error, Result};

/// Environment variable holding the host workspace
pub const WORKSPACE_VAR: &str = "WM_WORKSPACE";
/// Environment variable holding the id of the running job
pub const JOB_ID_VAR: &str = "WM_JOB_ID";
/// Environment variable holding the job's bearer token
pub const TOKEN_VAR: &str = "WM_TOKEN";
/// Environment variable holding the host API root reachable from workers
pub const INTERNAL_URL_VAR: &str = "BASE_INTERNAL_URL";
/// Environment variable holding the public host API root
pub const BASE_URL_VAR: &str = "BASE_URL";

/// Context supplied by the host engine to a step invocation
///
/// Steps never read this from global state; it is always passed explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecutionContext {
    /// Workspace the flow runs in
    pub workspace: String,
    /// Id of the job executing the step
    pub job_id: String,
    /// Root URL of the host API
    pub base_url: String,
    /// Bearer token authorising calls back to the host
    pub token: String,
    /// Optional approver recorded with the resume URLs
    pub approver: Option<String>,
}

impl ExecutionContext {
    /// Creates a context from its parts
    pub fn new(workspace: &str, job_id: &str, base_url: &str, token: &str) -> Self {
        ExecutionContext {
            workspace: workspace.to_string(),
            job_id: job_id.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            approver: None,
        }
    }

    /// Sets the approver
    pub fn with_approver(mut self, approver: &str) -> Self {
        self.approver = Some(approver.to_string());
        self
    }

    /// Builds the context from the variables the host injects into the job
    ///
    /// # Errors
    /// Returns a host capability error naming the first missing variable
    pub fn from_env() -> Result<Self> {
        let base_url = env::var(INTERNAL_URL_VAR)
            .or_else(|_| env::var(BASE_URL_VAR))
            .map_err(|_| {
                host_capability_error(&format!(
                    "neither {INTERNAL_URL_VAR} nor {BASE_URL_VAR} is set"
                ))
            })?;

        Ok(ExecutionContext::new(
            &required_var(WORKSPACE_VAR)?,
            &required_var(JOB_ID_VAR)?,
            &base_url,
            &required_var(TOKEN_VAR)?,
        ))
    }

    /// Checks that every field needed to reach the host is present
    ///
    /// # Errors
    /// Returns a host capability error naming the first empty field
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("workspace", &self.workspace),
            ("job id", &self.job_id),
            ("base url", &self.base_url),
            ("token", &self.token),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(host_capability_error(&format!(
                    "execution context has no {name}"
                )));
            }
        }
        Ok(())
    }
}

fn required_var(name: &str) -> Result<String> {
    env::var(name).map_err(|_| host_capability_error(&format!("{name} is not set")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_trailing_slash() {
        let ctx = ExecutionContext::new("ws", "job", "http://host/", "tok");
        assert_eq!(ctx.base_url, "http://host");
        assert!(ctx.approver.is_none());
    }

    #[test]
    fn test_validate_reports_missing_field() {
        let ctx = ExecutionContext::new("ws", "", "http://host", "tok");
        let error = ctx.validate().unwrap_err();
        assert!(error.is_host_capability());
        assert!(error.to_string().contains("job id"));
    }

    #[test]
    fn test_validate_accepts_complete_context() {
        let ctx = ExecutionContext::new("ws", "job", "http://host", "tok").with_approver("ana");
        assert!(ctx.validate().is_ok());
        assert_eq!(ctx.approver.as_deref(), Some("ana"));
    }
}
