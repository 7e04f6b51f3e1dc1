//! Step runner
//!
//! Executes one [`StepCommand`] the way the host engine would and returns the
//! JSON payload the step produced.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};
use serde_json::Value;

use crate::cli::StepCommand;
use crate::config::Config;
use crate::file_input::FileInput;
use crate::host::{ExecutionContext, FixedHost, HostClient, WindmillHost};
use crate::logging::format_status;
use crate::mostqi::MostQiClient;
use crate::shortener::LinkShortener;
use crate::steps::{
    ApprovalForm, ExtractionOutcome, OutcomeStatus, ValidationInput, extract_front,
    extract_qrcode, face_match, liveness_instructions, liveness_start, liveness_status, validate,
};

/// Payload of a finished step
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutput {
    pub payload: Value,
    /// False when the step reported an error in its payload
    pub succeeded: bool,
}

impl StepOutput {
    fn from_outcome(outcome: ExtractionOutcome) -> Result<Self> {
        info!("Step finished: {}", format_status(outcome.status.as_str()));
        Ok(StepOutput {
            succeeded: outcome.status != OutcomeStatus::Erro,
            payload: serde_json::to_value(outcome)?,
        })
    }

    fn from_form(form: ApprovalForm) -> Result<Self> {
        let succeeded = !form.title.starts_with("Erro");
        let status = if succeeded { "sucesso" } else { "erro" };
        info!("Step finished: {}", format_status(status));
        Ok(StepOutput {
            succeeded,
            payload: serde_json::to_value(form)?,
        })
    }
}

fn client_key(explicit: &Option<String>, config: &Config) -> String {
    explicit
        .as_deref()
        .or_else(|| config.client_key())
        .unwrap_or_default()
        .to_string()
}

/// A base64 argument may also name a file holding the base64 text
fn read_base64_argument(value: &str) -> Result<String> {
    let path = Path::new(value);
    if path.is_file() {
        debug!("Reading base64 content from {}", path.display());
        return fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()));
    }
    Ok(value.to_string())
}

/// Runs a single step
///
/// # Errors
/// Instruction steps fail when the host capability fails; processing steps
/// only fail when their payload cannot be serialised. A validation input that
/// cannot be read or parsed is an error as well.
pub async fn run(command: &StepCommand, config: &Config) -> Result<StepOutput> {
    let client = || MostQiClient::new(&config.mostqi);

    match command {
        StepCommand::Instruction {
            step,
            urls,
            approver,
        } => {
            let (host, ctx) = match urls {
                Some(urls) => (
                    Box::new(FixedHost::new(&urls.resume, &urls.cancel)) as Box<dyn HostClient>,
                    ExecutionContext::default(),
                ),
                None => (
                    Box::new(WindmillHost::default()) as Box<dyn HostClient>,
                    ExecutionContext::from_env()?,
                ),
            };
            let ctx = match approver {
                Some(approver) => ctx.with_approver(approver),
                None => ctx,
            };

            let response = step.run(host.as_ref(), &ctx).await?;
            Ok(StepOutput {
                payload: serde_json::to_value(response)?,
                succeeded: true,
            })
        }
        StepCommand::ExtractFront { client_key: key, image } => StepOutput::from_outcome(
            extract_front(
                &client()?,
                config,
                &client_key(key, config),
                FileInput::from(image.as_str()),
            )
            .await,
        ),
        StepCommand::ExtractQrCode { client_key: key, image } => StepOutput::from_outcome(
            extract_qrcode(
                &client()?,
                &client_key(key, config),
                FileInput::from(image.as_str()),
            )
            .await,
        ),
        StepCommand::LivenessStart { client_key: key } => StepOutput::from_form(
            liveness_start(&client()?, config, &client_key(key, config)).await,
        ),
        StepCommand::LivenessInstructions { session_url } => StepOutput::from_form(
            liveness_instructions(&LinkShortener::from_config(config)?, session_url).await,
        ),
        StepCommand::LivenessStatus {
            client_key: key,
            process_id,
        } => StepOutput::from_form(
            liveness_status(&client()?, &client_key(key, config), process_id).await,
        ),
        StepCommand::FaceMatch {
            client_key: key,
            face_a,
            face_b,
        } => {
            let face_b = read_base64_argument(face_b)?;
            StepOutput::from_form(
                face_match(
                    &client()?,
                    config,
                    &client_key(key, config),
                    FileInput::from(face_a.as_str()),
                    &face_b,
                )
                .await,
            )
        }
        StepCommand::Validate { input } => {
            let content = fs::read_to_string(input)
                .with_context(|| format!("Failed to read validation input {}", input.display()))?;
            let input: ValidationInput =
                serde_json::from_str(&content).context("Validation input is not valid JSON")?;
            let report = validate(&input);
            info!(
                "Validation finished: data {}%, approved: {}",
                report.score_dados,
                report.is_approved()
            );
            Ok(StepOutput {
                payload: serde_json::to_value(report)?,
                succeeded: true,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_client_key_wins() {
        let mut config = Config::default();
        config.mostqi.client_key = Some("from-config".to_string());

        assert_eq!(client_key(&Some("cli".to_string()), &config), "cli");
        assert_eq!(client_key(&None, &config), "from-config");
        assert_eq!(client_key(&None, &Config::default()), "");
    }

    #[test]
    fn test_form_failure_detection() {
        let output = StepOutput::from_form(ApprovalForm::message("Erro HTTP", "x")).unwrap();
        assert!(!output.succeeded);
        let output = StepOutput::from_form(ApprovalForm::form("Status: Finished", "x")).unwrap();
        assert!(output.succeeded);
    }

    #[test]
    fn test_base64_argument_passes_through() {
        assert_eq!(read_base64_argument("QUJD").unwrap(), "QUJD");
    }
}
