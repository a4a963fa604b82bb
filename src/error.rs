//! Error types shared across scoring providers, extraction, and configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from scoring providers.
///
/// A non-success HTTP status is not represented here: the remote provider
/// degrades it to an empty score bundle. Only faults the caller must see
/// surface as `ProviderError`.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode scoring response: {0}")]
    Decode(String),

    #[error("Backend not available: {0}")]
    BackendNotAvailable(String),

    #[error("Inference failed for model '{model}': {reason}")]
    Inference { model: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors from annotation extraction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("record nesting exceeds the maximum depth of {max_depth}")]
    DepthExceeded { max_depth: usize },
}

/// Errors loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}
