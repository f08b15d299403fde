//! Publishing and reading shares through a file-backed SQLite database.

mod common;

use std::sync::Arc;

use common::{catalog, open_memory, sort_all};
use valueslens::adapters::sqlite::initialize_database;
use valueslens::adapters::SqliteDurableStore;
use valueslens::domain::ports::DurableStore;
use valueslens::services::{DefinitionGateway, ShareService};
use valueslens::DomainError;

#[tokio::test]
async fn test_published_share_survives_reopening_database() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("valueslens.db");
    let db_path = db_path.to_string_lossy().into_owned();
    let catalog = catalog();

    let (_, mut manager) = open_memory().await;
    let very = sort_all(&mut manager, &catalog, 5).await;
    manager.auto_select().await.unwrap();
    manager.set_ranking(very).await.unwrap();
    manager
        .generate_definitions(&DefinitionGateway::fallback_only(), &catalog, false)
        .await
        .unwrap();

    let slug = {
        let pool = initialize_database(&db_path, 2).await.unwrap();
        let service = ShareService::new(Arc::new(SqliteDurableStore::new(pool.clone())));
        let artifact = service.publish(&mut manager, &catalog).await.unwrap();
        assert_eq!(artifact.values.len(), 3);
        pool.close().await;
        artifact.slug
    };

    // migrations are idempotent on reopen
    let pool = initialize_database(&db_path, 2).await.unwrap();
    let store = SqliteDurableStore::new(pool);
    let artifact = store.get_share(&slug).await.unwrap().unwrap();
    assert_eq!(artifact.session_id, manager.session().id());

    let snapshot = store.fetch_session_by_slug(&slug).await.unwrap().unwrap();
    assert_eq!(snapshot.share_slug.as_deref(), Some(slug.as_str()));
    assert_eq!(snapshot.ranked_values.len(), 5);
}

#[tokio::test]
async fn test_publish_without_ranking_fails() {
    let catalog = catalog();
    let (_, mut manager) = open_memory().await;
    manager.start(&catalog).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let pool = initialize_database(&dir.path().join("v.db").to_string_lossy(), 1)
        .await
        .unwrap();
    let service = ShareService::new(Arc::new(SqliteDurableStore::new(pool)));
    assert!(matches!(
        service.publish(&mut manager, &catalog).await,
        Err(DomainError::NoRanking)
    ));
}
