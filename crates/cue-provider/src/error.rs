//! Error types for the cue-provider crate.

/// Errors that can occur while talking to a generation backend.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-JSON error response
    #[error("API error: {0}")]
    ApiError(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Missing or rejected credential
    #[error("Authentication error: {0}")]
    Auth(String),
}
