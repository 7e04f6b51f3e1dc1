//! File inputs
//!
//! The host hands uploaded files to steps in several representations. This
//! module turns any of them into raw bytes.

use std::fs;
use std::path::Path;

use base64::{Engine as _, engine::general_purpose};
use log::{debug, error};

use crate::errors::{file_decoding_error, Result};
use crate::utils::strip_data_uri;

/// A file as received from the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileInput {
    /// Raw content
    Bytes(Vec<u8>),
    /// A `data:` URI, bare base64 or a filesystem path
    Text(String),
}

impl FileInput {
    /// Whether the input carries nothing at all
    pub fn is_empty(&self) -> bool {
        match self {
            FileInput::Bytes(bytes) => bytes.is_empty(),
            FileInput::Text(text) => text.trim().is_empty(),
        }
    }

    /// Resolves the input to its binary content
    ///
    /// Strings are first read as (optionally `data:`-prefixed) base64 and only
    /// then as a path.
    ///
    /// # Errors
    /// Returns a file decoding error if a string is neither valid base64 nor a
    /// readable file
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        match self {
            FileInput::Bytes(bytes) => Ok(bytes),
            FileInput::Text(text) => decode_text(&text),
        }
    }
}

impl From<Vec<u8>> for FileInput {
    fn from(bytes: Vec<u8>) -> Self {
        FileInput::Bytes(bytes)
    }
}

impl From<&[u8]> for FileInput {
    fn from(bytes: &[u8]) -> Self {
        FileInput::Bytes(bytes.to_vec())
    }
}

impl From<String> for FileInput {
    fn from(text: String) -> Self {
        FileInput::Text(text)
    }
}

impl From<&str> for FileInput {
    fn from(text: &str) -> Self {
        FileInput::Text(text.to_string())
    }
}

fn decode_text(text: &str) -> Result<Vec<u8>> {
    let payload = strip_data_uri(text);
    if let Ok(bytes) = decode_base64(payload) {
        return Ok(bytes);
    }

    let path = Path::new(text.trim());
    match fs::read(path) {
        Ok(bytes) => {
            debug!("Read {} bytes from {}", bytes.len(), path.display());
            Ok(bytes)
        }
        Err(e) => {
            error!("Could not extract file content: {e}");
            Err(file_decoding_error(
                "string is neither base64 nor a readable file path",
            ))
        }
    }
}

/// Strictly decodes standard base64
///
/// # Errors
/// Returns a file decoding error for malformed input
pub fn decode_base64(payload: &str) -> Result<Vec<u8>> {
    general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| file_decoding_error(&format!("invalid base64: {e}")))
}
