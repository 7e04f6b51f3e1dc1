//! Host engine module
//!
//! This module contains the capability the host workflow engine exposes to
//! steps: issuing the resume/cancel URLs for the current job.

mod context;
mod windmill;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::Result;

pub use context::{
    BASE_URL_VAR, ExecutionContext, INTERNAL_URL_VAR, JOB_ID_VAR, TOKEN_VAR, WORKSPACE_VAR,
};
pub use windmill::WindmillHost;

/// Callback URLs issued by the host for one suspended job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeUrls {
    /// Advances the flow to its next step
    pub resume: String,
    /// Aborts the flow
    pub cancel: String,
    /// Page where an approver can resume or cancel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_page: Option<String>,
}

impl ResumeUrls {
    pub fn new(resume: &str, cancel: &str) -> Self {
        ResumeUrls {
            resume: resume.to_string(),
            cancel: cancel.to_string(),
            approval_page: None,
        }
    }
}

/// Capability of the host engine consumed by the instruction steps
///
/// Implementations either return both URLs or fail; there is no partial result.
#[async_trait]
pub trait HostClient: Send + Sync {
    /// Requests a fresh pair of resume/cancel URLs for the job in `ctx`
    async fn get_resume_urls(&self, ctx: &ExecutionContext) -> Result<ResumeUrls>;
}

/// Host stand-in that always hands out the same URLs
///
/// Used when the URLs are already known, e.g. passed on the command line.
#[derive(Debug, Clone)]
pub struct FixedHost {
    urls: ResumeUrls,
}

impl FixedHost {
    pub fn new(resume: &str, cancel: &str) -> Self {
        FixedHost {
            urls: ResumeUrls::new(resume, cancel),
        }
    }
}

#[async_trait]
impl HostClient for FixedHost {
    async fn get_resume_urls(&self, _ctx: &ExecutionContext) -> Result<ResumeUrls> {
        Ok(self.urls.clone())
    }
}
