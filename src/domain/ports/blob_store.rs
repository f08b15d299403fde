//! Client-local persistence port.

use anyhow::Result;
use async_trait::async_trait;

/// Key/value blob storage that survives restarts of the client.
///
/// Callers treat every error as soft: a failed read means "no prior state"
/// and a failed write means "not yet durable".
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Read a blob. `Ok(None)` when the key has never been written.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a blob, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a blob. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}
