//! Workflow steps
//!
//! Every step the host engine can run. Instruction steps need the host
//! capability, processing steps talk to the mostQI API and the final
//! validation runs locally.

mod extraction;
mod face_match;
mod instructions;
mod liveness;
pub mod response;
pub mod validation;

pub use extraction::{extract_front, extract_qrcode};
pub use face_match::face_match;
pub use instructions::{InstructionStep, front_instructions, qrcode_instructions, welcome};
pub use liveness::{liveness_instructions, liveness_start, liveness_status};
pub use response::{ApprovalForm, ExtractionOutcome, OutcomeStatus, StepResponse};
pub use validation::{ValidationInput, ValidationReport, validate};
