//! HTTP implementation of the host capability
//!
//! Talks to the workflow engine's job API to obtain resume URLs.

use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;

use crate::errors::{host_capability_error, host_capability_error_from, Result};

use super::{ExecutionContext, HostClient, ResumeUrls};

/// Host client backed by the engine's REST API
#[derive(Debug, Clone, Default)]
pub struct WindmillHost {
    client: Client,
}

impl WindmillHost {
    pub fn new(client: Client) -> Self {
        WindmillHost { client }
    }

    /// URL of the resume-URL endpoint for the job in `ctx` with the given nonce
    pub fn resume_urls_endpoint(ctx: &ExecutionContext, nonce: u32) -> String {
        format!(
            "{}/api/w/{}/jobs/resume_urls/{}/{}",
            ctx.base_url, ctx.workspace, ctx.job_id, nonce
        )
    }
}

/// Random resume id, one per request
fn resume_nonce() -> u32 {
    uuid::Uuid::new_v4().as_u128() as u32
}

#[async_trait]
impl HostClient for WindmillHost {
    async fn get_resume_urls(&self, ctx: &ExecutionContext) -> Result<ResumeUrls> {
        ctx.validate()?;

        let url = WindmillHost::resume_urls_endpoint(ctx, resume_nonce());
        debug!("Requesting resume URLs from {url}");

        let mut request = self.client.get(&url).bearer_auth(&ctx.token);
        if let Some(approver) = &ctx.approver {
            request = request.query(&[("approver", approver)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| host_capability_error_from(e, "host unreachable"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Host refused resume URLs: {status} - {body}");
            return Err(host_capability_error(&format!(
                "host answered {}: {}",
                status.as_u16(),
                body
            )));
        }

        response
            .json::<ResumeUrls>()
            .await
            .map_err(|e| host_capability_error_from(e, "malformed resume URL response"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_urls_endpoint() {
        let ctx = ExecutionContext::new("acme", "0192-abc", "http://engine:8000/", "t");
        assert_eq!(
            WindmillHost::resume_urls_endpoint(&ctx, 42),
            "http://engine:8000/api/w/acme/jobs/resume_urls/0192-abc/42"
        );
    }

    #[tokio::test]
    async fn test_invalid_context_fails_without_request() {
        let host = WindmillHost::default();
        let error = host
            .get_resume_urls(&ExecutionContext::default())
            .await
            .unwrap_err();
        assert!(error.is_host_capability());
    }
}
