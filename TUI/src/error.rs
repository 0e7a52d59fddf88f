//! Error types for generation and configuration.

use thiserror::Error;

/// Fallback shown when the service fails without a usable `error` field.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Terminal failure of one generation cycle.
///
/// The `Display` output is the exact text shown in the status line, so
/// callers never need to format these themselves.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The service answered with a non-success status
    #[error("Error: {0}")]
    Service(String),

    /// The request never completed, or the body could not be read
    #[error("Failed to generate: {0}")]
    Transport(String),

    /// The archive arrived but could not be written to disk
    #[error("Failed to generate: {0}")]
    Save(String),
}

impl GenerationError {
    /// Build a service error from the optional `error`/`detail` fields of a
    /// failure body.
    pub fn from_service_body(error: Option<String>, detail: Option<String>) -> Self {
        let error = error
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());
        match (error, detail) {
            (Some(error), Some(detail)) if !detail.trim().is_empty() => {
                GenerationError::Service(format!("{} ({})", error, detail.trim()))
            }
            (Some(error), _) => GenerationError::Service(error),
            (None, _) => GenerationError::Service(UNKNOWN_ERROR.to_string()),
        }
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        // reqwest's Display omits the cause ("connection refused" etc.)
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        GenerationError::Transport(message)
    }
}

impl From<std::io::Error> for GenerationError {
    fn from(err: std::io::Error) -> Self {
        GenerationError::Save(err.to_string())
    }
}

/// Invalid startup configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid backend URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Output directory '{0}' does not exist or is not a directory")]
    OutputDirMissing(String),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}
