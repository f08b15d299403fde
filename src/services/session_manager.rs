//! Session lifecycle: load, persist-on-mutation, reset and schema upgrades.
//!
//! The manager owns one [`Session`] and an injected [`BlobStore`]. State is
//! read once when the manager is opened and written after every successful
//! mutation. Storage failures never surface to the caller: a bad read starts
//! fresh and a failed write leaves the session in memory, flagged as not
//! durable.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::definition_gateway::DefinitionGateway;
use super::prompt::GenerationRequest;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    AssessmentConfig, Category, Commitment, CommitmentUpdate, CustomValue, Definition,
    DefinitionEdit, Demographics, Phase, SelectionPlan, Session, SessionSnapshot, UndoOutcome,
    ValueCatalog,
};
use crate::domain::ports::{BlobStore, DurableStore};

/// Blob key the session is stored under.
pub const SESSION_KEY: &str = "session";

/// Current persisted schema version.
pub const SCHEMA_VERSION: u32 = 2;

/// Field renames applied when upgrading an unversioned blob.
const V1_RENAMES: [(&str, &str); 2] = [("ranked_values", "ranking"), ("story", "transcript")];

#[derive(Serialize)]
struct Envelope<'a> {
    version: u32,
    saved_at: DateTime<Utc>,
    session: &'a Session,
}

/// What happened when persisted state was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing was stored
    Fresh,
    /// Current-version state was restored
    Restored,
    /// Older state was upgraded and written back
    Migrated { from: u32 },
    /// Stored state was unusable and ignored
    Discarded { reason: String },
}

/// Decode a stored blob, upgrading older schemas.
///
/// Returns the session and the version it was stored at.
fn decode_blob(blob: &str) -> Result<(Session, u32), String> {
    let json: JsonValue = serde_json::from_str(blob).map_err(|e| format!("unparseable: {e}"))?;

    let (version, raw) = match json {
        JsonValue::Object(mut map) if map.contains_key("version") && map.contains_key("session") => {
            let version = map
                .get("version")
                .and_then(JsonValue::as_u64)
                .and_then(|v| u32::try_from(v).ok())
                .ok_or("version is not a number")?;
            let session = map.remove("session").unwrap_or(JsonValue::Null);
            (version, session)
        }
        other => (1, other),
    };

    let raw = match version {
        1 => upgrade_v1(raw)?,
        SCHEMA_VERSION => raw,
        other => return Err(format!("unknown schema version {other}")),
    };

    let session: Session =
        serde_json::from_value(raw).map_err(|e| format!("invalid session: {e}"))?;
    session.check_invariants()?;
    Ok((session, version))
}

/// Version 1 blobs were the bare session object with older field names.
fn upgrade_v1(raw: JsonValue) -> Result<JsonValue, String> {
    let JsonValue::Object(mut map) = raw else {
        return Err("session is not an object".to_string());
    };
    for (legacy, current) in V1_RENAMES {
        if let Some(value) = map.remove(legacy) {
            if !map.contains_key(current) {
                debug!(legacy, current, "renaming legacy session field");
                map.insert(current.to_string(), value);
            }
        }
    }
    Ok(JsonValue::Object(map))
}

/// Outcome of a definition generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DefinitionReport {
    /// Values whose stored definition was replaced
    pub applied: Vec<String>,
    /// Values kept because the user had edited them
    pub kept: Vec<String>,
    /// Values that came from the local generator
    pub fallback: Vec<String>,
}

pub struct SessionManager<S: BlobStore> {
    store: Arc<S>,
    key: String,
    rules: AssessmentConfig,
    session: Session,
    durable: bool,
    load_outcome: LoadOutcome,
}

impl<S: BlobStore> SessionManager<S> {
    /// Open the manager, reading any prior state from the store.
    pub async fn open(store: Arc<S>, rules: AssessmentConfig) -> Self {
        Self::open_with_key(store, SESSION_KEY, rules).await
    }

    pub async fn open_with_key(store: Arc<S>, key: &str, rules: AssessmentConfig) -> Self {
        let mut manager = Self {
            store,
            key: key.to_string(),
            rules,
            session: Session::default(),
            durable: true,
            load_outcome: LoadOutcome::Fresh,
        };
        manager.load().await;
        manager
    }

    async fn load(&mut self) {
        let blob = match self.store.get(&self.key).await {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                self.load_outcome = LoadOutcome::Fresh;
                return;
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "failed to read session state; starting fresh");
                self.load_outcome = LoadOutcome::Discarded {
                    reason: e.to_string(),
                };
                return;
            }
        };

        match decode_blob(&blob) {
            Ok((session, version)) if version == SCHEMA_VERSION => {
                debug!(session_id = %session.id(), "restored session state");
                self.session = session;
                self.load_outcome = LoadOutcome::Restored;
            }
            Ok((session, version)) => {
                info!(session_id = %session.id(), from = version, to = SCHEMA_VERSION, "upgraded session state");
                self.session = session;
                self.load_outcome = LoadOutcome::Migrated { from: version };
                self.persist().await;
            }
            Err(reason) => {
                warn!(key = %self.key, %reason, "ignoring unusable session state");
                self.load_outcome = LoadOutcome::Discarded { reason };
            }
        }
    }

    async fn persist(&mut self) {
        let envelope = Envelope {
            version: SCHEMA_VERSION,
            saved_at: Utc::now(),
            session: &self.session,
        };
        let result = match serde_json::to_string(&envelope) {
            Ok(blob) => self.store.set(&self.key, &blob).await,
            Err(e) => Err(e.into()),
        };

        match result {
            Ok(()) => self.durable = true,
            Err(e) => {
                warn!(key = %self.key, error = %e, "failed to persist session; continuing in memory");
                self.durable = false;
            }
        }
    }

    /// Run a session mutation and persist it if it succeeded.
    async fn mutate<T>(
        &mut self,
        f: impl FnOnce(&mut Session, &AssessmentConfig) -> DomainResult<T>,
    ) -> DomainResult<T> {
        let value = f(&mut self.session, &self.rules)?;
        self.persist().await;
        Ok(value)
    }

    /// Like `mutate`, but only writes when `f` reports a change.
    async fn mutate_if_changed(
        &mut self,
        f: impl FnOnce(&mut Session, &AssessmentConfig) -> DomainResult<bool>,
    ) -> DomainResult<bool> {
        let changed = f(&mut self.session, &self.rules)?;
        if changed {
            self.persist().await;
        }
        Ok(changed)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn rules(&self) -> &AssessmentConfig {
        &self.rules
    }

    /// False when the latest write did not reach the store.
    pub fn is_durable(&self) -> bool {
        self.durable
    }

    pub fn load_outcome(&self) -> &LoadOutcome {
        &self.load_outcome
    }

    pub fn is_in_progress(&self) -> bool {
        self.session.is_started() && self.session.is_in_progress()
    }

    pub fn resume_route(&self) -> Phase {
        self.session.resume_route(&self.rules)
    }

    pub fn snapshot(&self, catalog: &ValueCatalog) -> DomainResult<SessionSnapshot> {
        SessionSnapshot::from_session(&self.session, catalog, &self.rules)
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Start a new session with a fresh id and a shuffled catalog order.
    ///
    /// Discards any existing session.
    pub async fn start(&mut self, catalog: &ValueCatalog) -> DomainResult<String> {
        let mut order = catalog.ids();
        order.shuffle(&mut rand::thread_rng());
        let id = Uuid::new_v4().to_string();
        self.init_session(id.clone(), order).await?;
        Ok(id)
    }

    /// Replace the current session with an empty one over `order`.
    pub async fn init_session(&mut self, id: String, order: Vec<String>) -> DomainResult<()> {
        if id.trim().is_empty() {
            return Err(DomainError::ValidationFailed(
                "session id cannot be empty".to_string(),
            ));
        }
        if order.is_empty() {
            return Err(DomainError::ValidationFailed(
                "presentation order cannot be empty".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = order.iter().find(|id| !seen.insert(id.as_str())) {
            return Err(DomainError::DuplicateValue(dup.clone()));
        }

        if self.session.is_started() {
            info!(previous = %self.session.id(), "discarding previous session");
        }
        info!(session_id = %id, values = order.len(), "session initialized");
        self.session = Session::new(id, order);
        self.persist().await;
        Ok(())
    }

    /// Return every field to its empty state and drop stored state.
    pub async fn reset(&mut self) {
        self.session = Session::default();
        match self.store.remove(&self.key).await {
            Ok(()) => self.durable = true,
            Err(e) => {
                warn!(key = %self.key, error = %e, "failed to clear stored session");
                self.durable = false;
            }
        }
    }

    pub async fn set_consent(&mut self, consent: bool) -> DomainResult<()> {
        self.mutate(|s, _| s.set_consent(consent)).await
    }

    pub async fn set_demographics(&mut self, demographics: Demographics) -> DomainResult<()> {
        self.mutate(|s, _| s.set_demographics(demographics)).await
    }

    // ------------------------------------------------------------------
    // Sorting
    // ------------------------------------------------------------------

    pub async fn assign(&mut self, value_id: &str, category: Category) -> DomainResult<()> {
        self.mutate(|s, _| s.assign(value_id, category)).await
    }

    pub async fn assign_current(&mut self, category: Category) -> DomainResult<String> {
        self.mutate(|s, _| s.assign_current(category)).await
    }

    pub async fn undo(&mut self) -> UndoOutcome {
        let outcome = self.session.undo();
        if outcome != UndoOutcome::Nothing {
            self.persist().await;
        }
        outcome
    }

    pub async fn add_custom_value(&mut self, name: &str) -> DomainResult<CustomValue> {
        self.mutate(|s, _| s.add_custom_value(name)).await
    }

    // ------------------------------------------------------------------
    // Selection & ranking
    // ------------------------------------------------------------------

    pub fn selection_plan(&self) -> SelectionPlan {
        self.session.selection_plan(&self.rules)
    }

    pub async fn auto_select(&mut self) -> DomainResult<bool> {
        self.mutate_if_changed(|s, rules| s.auto_select(rules)).await
    }

    /// Select as many values as the current plan asks for.
    pub async fn select(&mut self, ids: Vec<String>) -> DomainResult<()> {
        self.mutate(|s, rules| {
            let k = s.selection_target(rules);
            s.select_top_k(ids, k)
        })
        .await
    }

    pub async fn select_top_k(&mut self, ids: Vec<String>, k: usize) -> DomainResult<()> {
        self.mutate(|s, _| s.select_top_k(ids, k)).await
    }

    pub async fn set_ranking(&mut self, ids: Vec<String>) -> DomainResult<()> {
        self.mutate(|s, _| s.set_ranking(ids)).await
    }

    pub async fn move_ranked_up(&mut self, index: usize) -> DomainResult<bool> {
        self.mutate_if_changed(|s, _| s.move_ranked_up(index)).await
    }

    pub async fn move_ranked_down(&mut self, index: usize) -> DomainResult<bool> {
        self.mutate_if_changed(|s, _| s.move_ranked_down(index)).await
    }

    pub async fn move_ranked(&mut self, from: usize, to: usize) -> DomainResult<bool> {
        self.mutate_if_changed(|s, _| s.move_ranked(from, to)).await
    }

    // ------------------------------------------------------------------
    // Story, commitments, definitions
    // ------------------------------------------------------------------

    pub async fn set_transcript(&mut self, text: impl Into<String>) -> DomainResult<usize> {
        let text = text.into();
        self.mutate(|s, _| s.set_transcript(text)).await
    }

    pub async fn set_commitment(
        &mut self,
        value_id: &str,
        update: CommitmentUpdate,
    ) -> DomainResult<Commitment> {
        self.mutate(|s, rules| s.set_commitment(value_id, update, rules).cloned())
            .await
    }

    pub async fn edit_definition(
        &mut self,
        value_id: &str,
        edit: DefinitionEdit,
    ) -> DomainResult<Definition> {
        self.mutate(|s, rules| s.edit_definition(value_id, edit, rules).cloned())
            .await
    }

    /// Generate definitions for the top values and store them.
    ///
    /// Never fails because of the collaborator; only a missing ranking or an
    /// unresolvable value id is an error.
    pub async fn generate_definitions(
        &mut self,
        gateway: &DefinitionGateway,
        catalog: &ValueCatalog,
        overwrite_edited: bool,
    ) -> DomainResult<DefinitionReport> {
        let top = self.session.top_values(&self.rules).to_vec();
        if top.is_empty() {
            return Err(DomainError::NoRanking);
        }

        let values = top
            .iter()
            .map(|id| {
                self.session
                    .value_ref(catalog, id)
                    .ok_or_else(|| DomainError::UnknownValue(id.clone()))
            })
            .collect::<DomainResult<Vec<_>>>()?;
        let commitments: BTreeMap<String, Commitment> = self
            .session
            .commitments()
            .iter()
            .filter(|(id, _)| top.contains(id))
            .map(|(id, c)| (id.clone(), c.clone()))
            .collect();

        let request = GenerationRequest {
            values,
            transcript: self.session.transcript().to_string(),
            commitments,
        };
        let generated = gateway.generate(&request).await;

        let applied = self.session.apply_definitions(&generated, overwrite_edited);
        let report = DefinitionReport {
            kept: top.iter().filter(|id| !applied.contains(id)).cloned().collect(),
            fallback: generated
                .iter()
                .filter(|(id, g)| g.fallback && applied.contains(id))
                .map(|(id, _)| id.clone())
                .collect(),
            applied,
        };
        if !report.applied.is_empty() {
            self.persist().await;
        }
        Ok(report)
    }

    pub async fn record_share_slug(&mut self, slug: &str) -> DomainResult<()> {
        self.mutate(|s, _| s.record_share_slug(slug)).await
    }

    /// Push the current snapshot to durable storage. Best effort.
    pub async fn sync_durable<D: DurableStore + ?Sized>(
        &self,
        store: &D,
        catalog: &ValueCatalog,
    ) -> bool {
        let snapshot = match self.snapshot(catalog) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                debug!(error = %e, "nothing to sync");
                return false;
            }
        };
        match store.upsert_session(&snapshot).await {
            Ok(()) => true,
            Err(e) => {
                warn!(session_id = %snapshot.session_id, error = %e, "durable sync failed");
                false
            }
        }
    }
}
