//! Configuration module
//!
//! This module contains components for loading and validating configuration.

pub mod loader;
mod model;

pub use loader::{expand_value, load_config, load_or_default, locate_config, parse_config};
pub use model::{Config, LivenessConfig, MostQiConfig, Thresholds};
