//! Client-local blob stores.

pub mod file_store;
pub mod memory_store;

pub use file_store::FileBlobStore;
pub use memory_store::MemoryBlobStore;
