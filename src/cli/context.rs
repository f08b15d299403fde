//! Everything a command needs: configuration, catalog and the open session.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::warn;

use crate::adapters::sqlite::initialize_database;
use crate::adapters::{AnthropicClient, AnthropicConfig, FileBlobStore, SqliteDurableStore};
use crate::domain::models::{Config, ValueCatalog};
use crate::domain::ports::DefinitionCollaborator;
use crate::services::{DefinitionGateway, LoadOutcome, SessionManager, ShareService};

pub struct AppContext {
    pub config: Config,
    pub catalog: ValueCatalog,
    pub manager: SessionManager<FileBlobStore>,
}

impl AppContext {
    pub async fn new(config: Config) -> Result<Self> {
        let catalog = ValueCatalog::load(config.assessment.catalog_path.as_deref().map(Path::new))
            .context("Failed to load value catalog")?;

        let store = Arc::new(FileBlobStore::new(&config.storage.state_dir));
        let manager = SessionManager::open(store, config.assessment.clone()).await;
        if let LoadOutcome::Discarded { reason } = manager.load_outcome() {
            warn!(%reason, "saved session could not be restored; starting fresh");
        }

        Ok(Self {
            config,
            catalog,
            manager,
        })
    }

    /// Display name for a value id, falling back to the id itself.
    pub fn value_name(&self, value_id: &str) -> String {
        self.manager
            .session()
            .value_ref(&self.catalog, value_id)
            .map_or_else(|| value_id.to_string(), |v| v.name)
    }

    pub fn gateway(&self) -> Result<DefinitionGateway> {
        let client = AnthropicClient::new(AnthropicConfig::from_generation(&self.config.generation))
            .context("Failed to build definition collaborator")?;
        let collaborator: Arc<dyn DefinitionCollaborator> = Arc::new(client);
        Ok(DefinitionGateway::from_config(Some(collaborator), &self.config.generation))
    }

    pub async fn share_service(&self) -> Result<ShareService<SqliteDurableStore>> {
        let storage = &self.config.storage;
        let pool = initialize_database(&storage.database_path, storage.max_connections)
            .await
            .with_context(|| format!("Failed to open database at {}", storage.database_path))?;
        Ok(ShareService::new(Arc::new(SqliteDurableStore::new(pool))))
    }
}
