//! Transport trait definition.

use crate::error::ProviderError;
use crate::types::HttpRequest;
use async_trait::async_trait;
use serde_json::Value;

/// One JSON POST to a generation backend.
///
/// A rejected call surfaces as `Err`. A backend error payload is still `Ok` and is
/// recognised later by [`crate::parse_reply`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Transport name (e.g., "http").
    fn name(&self) -> &str;

    /// Send the request and return the decoded JSON body.
    async fn post(&self, request: HttpRequest) -> Result<Value, ProviderError>;
}

// Compile-time check: Transport must be object-safe
const _: () = {
    fn _assert_object_safe(_: &dyn Transport) {}
};
