//! Request payloads and reply parsing shared by the core and the transport.

use crate::error::ProviderError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of output a backend call produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// Plain text completion.
    #[default]
    Text,
    /// Chat completion over a message list.
    Chat,
    /// Image generation.
    Image,
}

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
    System,
}

/// One message of a chat payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Body of a text completion request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionPayload {
    pub model: String,
    pub prompt: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

/// Body of a chat completion request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatPayload {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

/// Body of an image generation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImagePayload {
    pub model: String,
    pub prompt: String,
    pub n: u32,
}

/// Request body, shaped by output kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Completion(CompletionPayload),
    Chat(ChatPayload),
    Image(ImagePayload),
}

impl Payload {
    /// Output kind this payload asks for.
    pub fn kind(&self) -> OutputKind {
        match self {
            Payload::Completion(_) => OutputKind::Text,
            Payload::Chat(_) => OutputKind::Chat,
            Payload::Image(_) => OutputKind::Image,
        }
    }

    /// Prompt text for completion and image payloads.
    pub fn prompt(&self) -> Option<&str> {
        match self {
            Payload::Completion(p) => Some(&p.prompt),
            Payload::Image(p) => Some(&p.prompt),
            Payload::Chat(_) => None,
        }
    }
}

/// A fully built backend call: target endpoint plus payload.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendRequest {
    pub endpoint: String,
    pub payload: Payload,
}

impl BackendRequest {
    /// Output kind of the call.
    pub fn kind(&self) -> OutputKind {
        self.payload.kind()
    }

    /// Build the HTTP request, authenticating with a bearer `api_key`.
    pub fn to_http(&self, api_key: &str) -> Result<HttpRequest, ProviderError> {
        Ok(HttpRequest {
            url: self.endpoint.clone(),
            headers: vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                ("Authorization".to_string(), format!("Bearer {api_key}")),
            ],
            body: serde_json::to_value(&self.payload)?,
        })
    }
}

/// JSON POST handed to a [`crate::Transport`].
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

/// Parsed backend response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendReply {
    /// The payload carried an `error` field.
    Error(String),
    /// Completion text (possibly empty).
    Text(String),
    /// Chat reply content (possibly empty).
    Chat(String),
    /// URL of the first generated image.
    Image(Option<String>),
}

impl BackendReply {
    pub fn is_error(&self) -> bool {
        matches!(self, BackendReply::Error(_))
    }
}

/// Parse a raw response body for a call of `kind`.
///
/// Parsing never fails: a missing or mistyped field yields an empty reply.
pub fn parse_reply(kind: OutputKind, body: &Value) -> BackendReply {
    if let Some(err) = body.get("error").filter(|e| !e.is_null()) {
        let message = err
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| err.to_string());
        return BackendReply::Error(message);
    }

    match kind {
        OutputKind::Text => {
            let resp: CompletionResponse = serde_json::from_value(body.clone()).unwrap_or_default();
            // Some endpoints answer with a bare `text` field instead of choices.
            let text = resp
                .text
                .or_else(|| resp.choices.into_iter().next().and_then(|c| c.text))
                .unwrap_or_default();
            BackendReply::Text(text.trim().to_string())
        }
        OutputKind::Chat => {
            let resp: ChatResponse = serde_json::from_value(body.clone()).unwrap_or_default();
            let text = resp
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message)
                .and_then(|m| m.content)
                .unwrap_or_default();
            BackendReply::Chat(text.trim().to_string())
        }
        OutputKind::Image => {
            let resp: ImageResponse = serde_json::from_value(body.clone()).unwrap_or_default();
            BackendReply::Image(resp.data.into_iter().next().and_then(|d| d.url))
        }
    }
}

// — Response types for deserialization —

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CompletionResponse {
    text: Option<String>,
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CompletionChoice {
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ChatChoice {
    message: Option<ChatResponseMessage>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ImageResponse {
    data: Vec<ImageDatum>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ImageDatum {
    url: Option<String>,
}
