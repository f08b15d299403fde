//! Adapters implementing the domain ports.

pub mod anthropic;
pub mod local;
pub mod render;
pub mod sqlite;

pub use anthropic::{AnthropicClient, AnthropicConfig};
pub use local::{FileBlobStore, MemoryBlobStore};
pub use render::TextCardRenderer;
pub use sqlite::SqliteDurableStore;
