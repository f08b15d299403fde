//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use valueslens::adapters::MemoryBlobStore;
use valueslens::domain::models::{AssessmentConfig, Category, ValueCatalog};
use valueslens::domain::ports::BlobStore;
use valueslens::services::SessionManager;

pub fn catalog() -> ValueCatalog {
    ValueCatalog::builtin().expect("built-in catalog is valid")
}

pub fn rules() -> AssessmentConfig {
    AssessmentConfig::default()
}

/// Story long enough for the default word limits.
pub fn story() -> String {
    "When my father got sick I took a leave from work to care for him, and I learned \
     that showing up honestly for the people I love matters more than any title I could earn."
        .to_string()
}

pub fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_string()).collect()
}

pub async fn open_memory() -> (Arc<MemoryBlobStore>, SessionManager<MemoryBlobStore>) {
    let store = Arc::new(MemoryBlobStore::new());
    let manager = SessionManager::open(store.clone(), rules()).await;
    (store, manager)
}

/// Start a session and file the first `very` cards as very important, the rest as less.
pub async fn sort_all<S: BlobStore>(
    manager: &mut SessionManager<S>,
    catalog: &ValueCatalog,
    very: usize,
) -> Vec<String> {
    manager.start(catalog).await.expect("session starts");
    let mut very_ids = Vec::new();
    for i in 0..catalog.len() {
        let category = if i < very { Category::Very } else { Category::Less };
        let id = manager.assign_current(category).await.expect("card files");
        if category == Category::Very {
            very_ids.push(id);
        }
    }
    very_ids
}
