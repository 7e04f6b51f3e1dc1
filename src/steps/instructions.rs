//! Instruction steps
//!
//! The steps that tell the operator what to submit next. Each one asks the host
//! for resume/cancel URLs and returns a fixed text bundle.

use std::fmt;
use std::str::FromStr;

use log::{debug, info};

use crate::constants::{FRONT_GUIDELINES, FRONT_TITLE, QRCODE_DESCRIPTION, WELCOME_DESCRIPTION};
use crate::errors::Result;
use crate::host::{ExecutionContext, HostClient};

use super::response::StepResponse;

/// The instruction steps, in flow order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionStep {
    /// Introduction to the whole validation flow
    Welcome,
    /// Guidance for photographing the front of the CNH
    FrontImage,
    /// Guidance for photographing the QR code on the back
    BackQrCode,
}

impl InstructionStep {
    /// All instruction steps in the order the host runs them
    pub const ALL: [InstructionStep; 3] = [
        InstructionStep::Welcome,
        InstructionStep::FrontImage,
        InstructionStep::BackQrCode,
    ];

    /// Heading of the step, if it has a separate one
    ///
    /// Only the front-image step sets a title; the others render
    /// description-only, with the QR-code heading embedded in the text.
    pub fn title(&self) -> Option<&'static str> {
        match self {
            InstructionStep::FrontImage => Some(FRONT_TITLE),
            InstructionStep::Welcome | InstructionStep::BackQrCode => None,
        }
    }

    /// Fixed instructional text of the step
    pub fn description(&self) -> String {
        match self {
            InstructionStep::Welcome => WELCOME_DESCRIPTION.to_string(),
            InstructionStep::FrontImage => FRONT_GUIDELINES.join("\n"),
            InstructionStep::BackQrCode => QRCODE_DESCRIPTION.to_string(),
        }
    }

    /// Command name of the step
    pub fn name(&self) -> &'static str {
        match self {
            InstructionStep::Welcome => "welcome",
            InstructionStep::FrontImage => "front-instructions",
            InstructionStep::BackQrCode => "qrcode-instructions",
        }
    }

    /// Runs the step
    ///
    /// # Errors
    /// Any failure of the host capability is returned unchanged
    pub async fn run(&self, host: &dyn HostClient, ctx: &ExecutionContext) -> Result<StepResponse> {
        debug!("Running instruction step {self} for job '{}'", ctx.job_id);
        let urls = host.get_resume_urls(ctx).await?;
        info!("Instruction step {self} ready");
        Ok(StepResponse::new(self.title(), self.description(), urls))
    }
}

impl fmt::Display for InstructionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for InstructionStep {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "welcome" => Ok(InstructionStep::Welcome),
            "front-instructions" => Ok(InstructionStep::FrontImage),
            "qrcode-instructions" => Ok(InstructionStep::BackQrCode),
            _ => Err(format!("Unknown instruction step: {s}")),
        }
    }
}

/// Welcome step: explains the flow and the three required inputs
pub async fn welcome(host: &dyn HostClient, ctx: &ExecutionContext) -> Result<StepResponse> {
    InstructionStep::Welcome.run(host, ctx).await
}

/// Front-image step: photography guidelines for the front of the CNH
pub async fn front_instructions(
    host: &dyn HostClient,
    ctx: &ExecutionContext,
) -> Result<StepResponse> {
    InstructionStep::FrontImage.run(host, ctx).await
}

/// Back/QR-code step: guidelines for capturing the QR code cleanly
pub async fn qrcode_instructions(
    host: &dyn HostClient,
    ctx: &ExecutionContext,
) -> Result<StepResponse> {
    InstructionStep::BackQrCode.run(host, ctx).await
}
