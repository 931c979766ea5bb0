//! cue-provider: backend request shapes, response parsing, and the HTTP transport.

mod error;
pub mod models;
pub mod openai;
pub mod traits;
pub mod types;

pub use error::ProviderError;
pub use models::{ModelCatalog, ModelDescriptor};
pub use openai::{default_endpoint, HttpTransport, OPENAI_BASE_URL};
pub use traits::Transport;
pub use types::{
    parse_reply, BackendReply, BackendRequest, ChatMessage, ChatPayload, ChatRole,
    CompletionPayload, HttpRequest, ImagePayload, OutputKind, Payload,
};
