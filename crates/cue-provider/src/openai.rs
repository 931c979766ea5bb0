//! HTTP transport for OpenAI-compatible endpoints.
//!
//! Handles the completions, chat completions and image generation routes used by
//! OpenAI and the many services that mirror its API.

use crate::error::ProviderError;
use crate::traits::Transport;
use crate::types::{HttpRequest, OutputKind};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

/// Base URL of the default backend.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Default endpoint for an output kind.
pub fn default_endpoint(kind: OutputKind) -> String {
    let route = match kind {
        OutputKind::Text => "completions",
        OutputKind::Chat => "chat/completions",
        OutputKind::Image => "images/generations",
    };
    format!("{OPENAI_BASE_URL}/{route}")
}

/// A transport that POSTs JSON with reqwest.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a new HTTP transport.
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Create a transport around an existing client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &str {
        "http"
    }

    async fn post(&self, request: HttpRequest) -> Result<Value, ProviderError> {
        let mut builder = self.client.post(&request.url);
        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }

        let response: reqwest::Response = builder
            .json(&request.body)
            .send()
            .await
            .map_err(ProviderError::Http)?;

        let status = response.status();
        let text: String = response.text().await.map_err(ProviderError::Http)?;

        // A JSON body is a reply even on an error status.
        match serde_json::from_str::<Value>(&text) {
            Ok(body) => {
                tracing::debug!(url = %request.url, %status, "backend responded");
                Ok(body)
            }
            Err(_) if !status.is_success() => {
                Err(ProviderError::ApiError(format!("HTTP {status}: {text}")))
            }
            Err(e) => Err(ProviderError::Serialization(e)),
        }
    }
}
