use std::env;

use serde_json::json;
use wiremock::matchers::{header, method, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cnh_validator::host::{
    BASE_URL_VAR, ExecutionContext, HostClient, INTERNAL_URL_VAR, JOB_ID_VAR, TOKEN_VAR,
    WORKSPACE_VAR, WindmillHost,
};
use cnh_validator::steps::welcome;

fn context_for(server: &MockServer) -> ExecutionContext {
    ExecutionContext::new("acme", "job-42", &server.uri(), "secret")
}

#[tokio::test]
async fn test_windmill_host_returns_urls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/api/w/acme/jobs/resume_urls/job-42/\d+$"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "approvalPage": "https://h/approve",
            "resume": "https://h/r1",
            "cancel": "https://h/c1",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let urls = WindmillHost::default()
        .get_resume_urls(&context_for(&server))
        .await
        .unwrap();

    assert_eq!(urls.resume, "https://h/r1");
    assert_eq!(urls.cancel, "https://h/c1");
    assert_eq!(urls.approval_page.as_deref(), Some("https://h/approve"));
}

#[tokio::test]
async fn test_windmill_host_sends_approver() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("approver", "maria"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"resume": "r", "cancel": "c"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context_for(&server).with_approver("maria");
    let urls = WindmillHost::default().get_resume_urls(&ctx).await.unwrap();
    assert_eq!(urls.resume, "r");
}

#[tokio::test]
async fn test_windmill_host_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let error = WindmillHost::default()
        .get_resume_urls(&context_for(&server))
        .await
        .unwrap_err();

    assert!(error.is_host_capability());
    assert!(error.to_string().contains("403"));
    assert!(error.to_string().contains("forbidden"));
}

#[tokio::test]
async fn test_windmill_host_malformed_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"resume": "r"})))
        .mount(&server)
        .await;

    let error = WindmillHost::default()
        .get_resume_urls(&context_for(&server))
        .await
        .unwrap_err();
    assert!(error.is_host_capability());
}

#[tokio::test]
async fn test_step_over_real_host_propagates_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let error = welcome(&WindmillHost::default(), &context_for(&server))
        .await
        .unwrap_err();
    assert!(error.is_host_capability());
}

// Single test touching the process environment so runs never race on it
#[test]
fn test_context_from_env() {
    unsafe {
        env::set_var(WORKSPACE_VAR, "acme");
        env::set_var(JOB_ID_VAR, "job-7");
        env::set_var(TOKEN_VAR, "tok");
        env::set_var(BASE_URL_VAR, "http://public");
        env::set_var(INTERNAL_URL_VAR, "http://internal:8000/");
    }

    let ctx = ExecutionContext::from_env().unwrap();
    assert_eq!(ctx.workspace, "acme");
    assert_eq!(ctx.job_id, "job-7");
    assert_eq!(ctx.token, "tok");
    assert_eq!(ctx.base_url, "http://internal:8000");

    unsafe {
        env::remove_var(INTERNAL_URL_VAR);
    }
    let ctx = ExecutionContext::from_env().unwrap();
    assert_eq!(ctx.base_url, "http://public");

    unsafe {
        env::remove_var(TOKEN_VAR);
    }
    let error = ExecutionContext::from_env().unwrap_err();
    assert!(error.is_host_capability());
    assert!(error.to_string().contains(TOKEN_VAR));

    unsafe {
        env::remove_var(WORKSPACE_VAR);
        env::remove_var(JOB_ID_VAR);
        env::remove_var(BASE_URL_VAR);
    }
}
