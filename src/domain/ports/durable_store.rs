//! Durable store port for finalized sessions and share artifacts.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{SessionSnapshot, ShareArtifact};

/// Server-side persistence.
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Insert or replace a session snapshot keyed by session id.
    async fn upsert_session(&self, snapshot: &SessionSnapshot) -> DomainResult<()>;

    /// Find the session a share slug was published from.
    async fn fetch_session_by_slug(&self, slug: &str) -> DomainResult<Option<SessionSnapshot>>;

    /// Write a new share artifact. Fails if the slug is taken.
    async fn create_share(&self, artifact: &ShareArtifact) -> DomainResult<()>;

    /// Get a share artifact by slug.
    async fn get_share(&self, slug: &str) -> DomainResult<Option<ShareArtifact>>;

    /// Replace an existing artifact's values.
    ///
    /// Returns `ShareNotFound` if no artifact has this slug.
    async fn update_share(&self, artifact: &ShareArtifact) -> DomainResult<()>;
}
