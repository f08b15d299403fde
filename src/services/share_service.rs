//! Publishing top values as share artifacts.

use std::sync::Arc;

use tracing::{info, warn};

use super::session_manager::SessionManager;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::share::generate_slug;
use crate::domain::models::{SessionSnapshot, ShareArtifact, ValueCatalog};
use crate::domain::ports::{BlobStore, DurableStore};

const SLUG_ATTEMPTS: usize = 3;

pub struct ShareService<D: DurableStore> {
    store: Arc<D>,
}

impl<D: DurableStore> ShareService<D> {
    pub fn new(store: Arc<D>) -> Self {
        Self { store }
    }

    /// Publish the session's top values.
    ///
    /// The first publish creates an artifact and records its slug in the
    /// session. Later publishes update that artifact in place.
    pub async fn publish<B: BlobStore>(
        &self,
        manager: &mut SessionManager<B>,
        catalog: &ValueCatalog,
    ) -> DomainResult<ShareArtifact> {
        let snapshot = manager.snapshot(catalog)?;

        if let Some(slug) = snapshot.share_slug.as_deref() {
            if let Some(mut artifact) = self.store.get_share(slug).await? {
                artifact.refresh(&snapshot)?;
                self.store.update_share(&artifact).await?;
                info!(%slug, "share artifact updated");
                self.sync(manager, catalog).await;
                return Ok(artifact);
            }
            warn!(%slug, "recorded share slug has no artifact; publishing a new one");
        }

        let slug = self.free_slug().await?;
        let artifact = ShareArtifact::new(slug.clone(), &snapshot)?;
        self.store.create_share(&artifact).await?;
        manager.record_share_slug(&slug).await?;
        info!(%slug, session_id = %artifact.session_id, "share artifact created");

        self.sync(manager, catalog).await;
        Ok(artifact)
    }

    async fn free_slug(&self) -> DomainResult<String> {
        for _ in 0..SLUG_ATTEMPTS {
            let slug = generate_slug();
            if self.store.get_share(&slug).await?.is_none() {
                return Ok(slug);
            }
        }
        Err(DomainError::DatabaseError(
            "could not allocate a unique share slug".to_string(),
        ))
    }

    async fn sync<B: BlobStore>(&self, manager: &SessionManager<B>, catalog: &ValueCatalog) {
        if !manager.sync_durable(self.store.as_ref(), catalog).await {
            warn!("session snapshot not synced to durable store");
        }
    }

    pub async fn get(&self, slug: &str) -> DomainResult<ShareArtifact> {
        self.store
            .get_share(slug)
            .await?
            .ok_or_else(|| DomainError::ShareNotFound(slug.to_string()))
    }

    pub async fn session_for(&self, slug: &str) -> DomainResult<SessionSnapshot> {
        self.store
            .fetch_session_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::ShareNotFound(slug.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::local::MemoryBlobStore;
    use crate::adapters::sqlite::{create_migrated_test_pool, SqliteDurableStore};
    use crate::domain::models::{AssessmentConfig, Category, DefinitionEdit};
    use crate::services::DefinitionGateway;

    async fn setup() -> (ShareService<SqliteDurableStore>, SessionManager<MemoryBlobStore>, ValueCatalog) {
        let pool = create_migrated_test_pool().await.unwrap();
        let service = ShareService::new(Arc::new(SqliteDurableStore::new(pool)));

        let rules = AssessmentConfig {
            selection_size: 2,
            top_count: 2,
            ..Default::default()
        };
        let mut manager = SessionManager::open(Arc::new(MemoryBlobStore::new()), rules).await;
        manager
            .init_session("s1".to_string(), vec!["integrity".to_string(), "care".to_string()])
            .await
            .unwrap();
        manager.assign_current(Category::Very).await.unwrap();
        manager.assign_current(Category::Very).await.unwrap();
        manager.auto_select().await.unwrap();
        manager
            .set_ranking(vec!["care".to_string(), "integrity".to_string()])
            .await
            .unwrap();

        (service, manager, ValueCatalog::builtin().unwrap())
    }

    #[tokio::test]
    async fn test_publish_requires_definitions() {
        let (service, mut manager, catalog) = setup().await;
        let err = service.publish(&mut manager, &catalog).await.unwrap_err();
        assert!(matches!(err, DomainError::PreconditionFailed(_)));
        assert!(manager.session().share_slug().is_none());
    }

    #[tokio::test]
    async fn test_publish_then_republish_updates_in_place() {
        let (service, mut manager, catalog) = setup().await;
        manager
            .generate_definitions(&DefinitionGateway::fallback_only(), &catalog, false)
            .await
            .unwrap();

        let first = service.publish(&mut manager, &catalog).await.unwrap();
        assert_eq!(manager.session().share_slug(), Some(first.slug.as_str()));
        assert_eq!(first.values[0].value_id, "care");

        manager
            .edit_definition(
                "care",
                DefinitionEdit {
                    tagline: Some("Showing up".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let second = service.publish(&mut manager, &catalog).await.unwrap();
        assert_eq!(second.slug, first.slug);

        let stored = service.get(&first.slug).await.unwrap();
        assert_eq!(stored.values[0].tagline, "Showing up");

        let snapshot = service.session_for(&first.slug).await.unwrap();
        assert_eq!(snapshot.session_id, "s1");
    }

    #[tokio::test]
    async fn test_get_unknown_slug() {
        let (service, _, _) = setup().await;
        assert!(matches!(
            service.get("missing").await,
            Err(DomainError::ShareNotFound(_))
        ));
    }
}
