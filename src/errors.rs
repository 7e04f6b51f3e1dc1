use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Custom error type for the CNH validator
#[derive(Debug)]
pub enum Error {
    /// The host engine could not issue resume/cancel URLs
    HostCapability {
        source: Option<Box<dyn StdError + Send + Sync>>,
        detail: String,
    },
    /// Authentication against the document API failed
    Authentication { detail: String },
    /// Transport-level failure while talking to an HTTP endpoint
    Http {
        source: reqwest::Error,
        operation: String,
    },
    /// An HTTP endpoint answered with an unexpected status
    Api { status: u16, body: String },
    /// A required step input is missing or empty
    InvalidInput { field: String, detail: String },
    /// File content could not be turned into bytes
    FileDecoding { detail: String },
    /// Error related to file operations
    FileOperation {
        source: io::Error,
        path: PathBuf,
        operation: String,
    },
    /// Generic error with a message
    Generic { message: String },
}

impl Error {
    /// Whether the error was caused by a request running out of time
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Http { source, .. } if source.is_timeout())
    }

    /// Whether a reply arrived but its body could not be decoded
    pub fn is_decode(&self) -> bool {
        matches!(self, Error::Http { source, .. } if source.is_decode())
    }

    /// Whether the error came from the host's resume URL capability
    pub fn is_host_capability(&self) -> bool {
        matches!(self, Error::HostCapability { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::HostCapability { detail, .. } => {
                write!(f, "Host capability failure: {detail}")
            }
            Error::Authentication { detail } => {
                write!(f, "Authentication failed: {detail}")
            }
            Error::Http { source, operation } => {
                write!(f, "Failed to {operation}: {source}")
            }
            Error::Api { status, body } => {
                write!(f, "API returned status {status}: {body}")
            }
            Error::InvalidInput { field, detail } => {
                write!(f, "Invalid input '{field}': {detail}")
            }
            Error::FileDecoding { detail } => {
                write!(f, "Could not extract file content: {detail}")
            }
            Error::FileOperation {
                path, operation, ..
            } => {
                write!(f, "Failed to {} file: {}", operation, path.display())
            }
            Error::Generic { message } => {
                write!(f, "{message}")
            }
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::HostCapability {
                source: Some(source),
                ..
            } => Some(source.as_ref()),
            Error::Http { source, .. } => Some(source),
            Error::FileOperation { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::FileOperation {
            source: err,
            path: PathBuf::new(),
            operation: "perform operation on".to_string(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http {
            source: err,
            operation: "send request".to_string(),
        }
    }
}

/// Custom Result type for the CNH validator
///
/// # Examples
/// ```
/// use cnh_validator::prelude::{Result, generic_error};
///
/// fn example_function() -> Result<String> {
///     // Return success
///     Ok("success".to_string())
///
///     // Or return an error
///     // Err(generic_error("Something went wrong"))
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// Helper function to create a host capability error
pub fn host_capability_error(detail: &str) -> Error {
    Error::HostCapability {
        source: None,
        detail: detail.to_string(),
    }
}

/// Helper function to create a host capability error wrapping its cause
pub fn host_capability_error_from<E: StdError + Send + Sync + 'static>(
    err: E,
    detail: &str,
) -> Error {
    Error::HostCapability {
        source: Some(Box::new(err)),
        detail: detail.to_string(),
    }
}

/// Helper function to create an authentication error
pub fn authentication_error(detail: &str) -> Error {
    Error::Authentication {
        detail: detail.to_string(),
    }
}

/// Helper function to create an HTTP transport error
pub fn http_error(err: reqwest::Error, operation: &str) -> Error {
    Error::Http {
        source: err,
        operation: operation.to_string(),
    }
}

/// Helper function to create an unexpected status error
pub fn api_error(status: u16, body: &str) -> Error {
    Error::Api {
        status,
        body: body.to_string(),
    }
}

/// Helper function to create an invalid input error
pub fn invalid_input_error(field: &str, detail: &str) -> Error {
    Error::InvalidInput {
        field: field.to_string(),
        detail: detail.to_string(),
    }
}

/// Helper function to create a file decoding error
pub fn file_decoding_error(detail: &str) -> Error {
    Error::FileDecoding {
        detail: detail.to_string(),
    }
}

/// Helper function to create a file operation error
pub fn file_operation_error(err: io::Error, path: PathBuf, operation: &str) -> Error {
    Error::FileOperation {
        source: err,
        path,
        operation: operation.to_string(),
    }
}

/// Helper function to create a generic error
pub fn generic_error(message: &str) -> Error {
    Error::Generic {
        message: message.to_string(),
    }
}
