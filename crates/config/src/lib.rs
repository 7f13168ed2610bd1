//! Configuration for the narrator audio service
//!
//! Settings are loaded from `config/default.yaml`, an optional
//! environment-specific file, and `NARRATOR__`-prefixed environment
//! variables, in increasing priority.

pub mod pipeline;
pub mod settings;

pub use pipeline::{MergeConfig, PublishConfig, SynthesisConfig};
pub use settings::{load_settings, ObservabilityConfig, ServerConfig, Settings};

use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}
