//! Error types for the cue-core crate.

use cue_doc::DocError;
use cue_provider::ProviderError;

/// Core error type for the menu pipeline.
#[derive(Debug, thiserror::Error)]
pub enum CueError {
    /// Document store write failed
    #[error("Document error: {0}")]
    Document(#[from] DocError),

    /// Backend call failed
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Trigger or reference pattern failed to compile
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Trigger token is empty
    #[error("Trigger token must not be empty")]
    EmptyTrigger,

    /// No node was recorded as the menu's target
    #[error("No target node for the menu")]
    NoTarget,

    /// Option needs a model but none serves its output kind
    #[error("No model available for option {0}")]
    NoModel(String),
}
