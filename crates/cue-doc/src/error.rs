//! Error types for the cue-doc crate.

/// Errors returned by document store writes.
#[derive(Debug, thiserror::Error)]
pub enum DocError {
    /// Node does not exist
    #[error("Node not found: {0}")]
    NotFound(String),
}
