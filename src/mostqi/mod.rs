//! mostQI module
//!
//! This module contains the client for the remote document-intelligence API
//! and the models of its responses.

mod client;
pub mod model;

pub use client::{MostQiClient, liveness_payload};
pub use model::{CnhData, ExtractionResponse, VioData};
