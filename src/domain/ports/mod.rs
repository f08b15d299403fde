//! Port trait definitions (Hexagonal Architecture)
//!
//! Interfaces the assessment engine depends on and adapters implement:
//! - DefinitionCollaborator: AI definition generation
//! - BlobStore: client-local key/value persistence
//! - DurableStore: finalized sessions and share artifacts
//! - CardRenderer: export of a finalized snapshot

pub mod blob_store;
pub mod card_renderer;
pub mod definition_collaborator;
pub mod durable_store;

pub use blob_store::BlobStore;
pub use card_renderer::{CardRenderer, RenderFormat};
pub use definition_collaborator::{CollaboratorError, DefinitionCollaborator, DefinitionPrompt};
pub use durable_store::DurableStore;
