//! ValuesLens - values assessment engine
//!
//! Drives a user through sorting value cards, selecting and ranking their
//! top values, telling the story behind them, committing to goals and
//! receiving personal definitions that can be exported or shared.
//!
//! # Architecture
//!
//! The crate follows a hexagonal layout:
//!
//! - **Domain Layer** (`domain`): session state, validation rules and ports
//! - **Service Layer** (`services`): session lifecycle, definition generation
//!   with local fallback, share publishing
//! - **Adapters** (`adapters`): Anthropic client, file and in-memory blob
//!   stores, SQLite durable store, card rendering
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use valueslens::adapters::MemoryBlobStore;
//! use valueslens::domain::models::{AssessmentConfig, Category, ValueCatalog};
//! use valueslens::services::SessionManager;
//!
//! let catalog = ValueCatalog::builtin()?;
//! let mut manager = SessionManager::open(Arc::new(MemoryBlobStore::new()), AssessmentConfig::default()).await;
//! manager.start(&catalog).await?;
//! manager.assign_current(Category::Very).await?;
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    AssessmentConfig, Category, Config, Phase, Session, SessionSnapshot, ValueCatalog,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{DefinitionGateway, SessionManager, ShareService};
