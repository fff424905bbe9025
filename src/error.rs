//! Error types for Butterfly.

use crate::service::Location;

/// Everything that can abort a Butterfly operation.
///
/// Neighbor-lookup failures never show up here: the expander recovers from
/// them locally and treats the occurrence as having no neighbors.
#[derive(Debug, thiserror::Error)]
pub enum ButterflyError {
    #[error("No function found at {0}")]
    NoFunctionAtLocation(Location),

    #[error("Language '{language}' is not supported. Supported languages are: {supported}")]
    UnsupportedLanguage { language: String, supported: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid exclusion pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, ButterflyError>;
