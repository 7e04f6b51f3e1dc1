pub use errors::*;

pub mod cli;
pub mod config;
pub mod constants;
mod errors;
pub mod file_input;
pub mod host;
pub mod logging;
pub mod mostqi;
pub mod runner;
pub mod shortener;
pub mod steps;
pub mod utils;

pub mod prelude {
    pub use crate::errors::{
        api_error, authentication_error, file_decoding_error, file_operation_error, generic_error,
        host_capability_error, host_capability_error_from, http_error, invalid_input_error,
    };
    pub use crate::errors::{Error, Result};
    pub use crate::file_input::FileInput;
    pub use crate::host::{ExecutionContext, FixedHost, HostClient, ResumeUrls, WindmillHost};
    pub use crate::logging::{LogLevel, format_status, init_logger, run_label};
    pub use crate::mostqi::MostQiClient;
    pub use crate::shortener::LinkShortener;
    pub use crate::steps::{
        ApprovalForm, ExtractionOutcome, InstructionStep, OutcomeStatus, StepResponse,
    };
}
