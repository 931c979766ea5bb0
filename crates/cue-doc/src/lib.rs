//! cue-doc: hierarchical document model and the document store interface.

mod error;
pub mod node;
pub mod store;

pub use error::DocError;
pub use node::{ContentNode, NewNode, NodeId};
pub use store::{DocumentStore, MemoryDocument};
