//! Finalized session payload handed to durable storage, sharing and export.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::config::AssessmentConfig;
use super::definition::Definition;
use super::narrative::word_count;
use super::session::{Demographics, Session};
use super::value::ValueCatalog;
use crate::domain::errors::{DomainError, DomainResult};

/// A ranked value with its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedValue {
    /// 1-based position in the ranking
    pub rank: usize,
    pub id: String,
    pub name: String,
}

/// A commitment with its derived implementation intention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitmentSnapshot {
    pub outcome: String,
    pub obstacle: String,
    pub plan: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implementation_intention: Option<String>,
    pub complete: bool,
}

/// Denormalized, read-only view of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    pub consent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demographics: Option<Demographics>,
    pub ranked_values: Vec<RankedValue>,
    pub top_values: Vec<RankedValue>,
    pub transcript: String,
    pub word_count: usize,
    pub commitments: BTreeMap<String, CommitmentSnapshot>,
    pub definitions: BTreeMap<String, Definition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_slug: Option<String>,
}

impl SessionSnapshot {
    /// Build the snapshot, resolving every ranked id to a name.
    pub fn from_session(
        session: &Session,
        catalog: &ValueCatalog,
        rules: &AssessmentConfig,
    ) -> DomainResult<Self> {
        if !session.is_started() {
            return Err(DomainError::SessionNotStarted);
        }

        let ranked_values = session
            .ranking()
            .iter()
            .enumerate()
            .map(|(i, id)| {
                session
                    .value_ref(catalog, id)
                    .map(|value| RankedValue {
                        rank: i + 1,
                        id: value.id,
                        name: value.name,
                    })
                    .ok_or_else(|| DomainError::UnknownValue(id.clone()))
            })
            .collect::<DomainResult<Vec<_>>>()?;

        let top_values = ranked_values
            .iter()
            .take(session.top_values(rules).len())
            .cloned()
            .collect();

        let commitments = session
            .commitments()
            .iter()
            .map(|(id, c)| {
                (
                    id.clone(),
                    CommitmentSnapshot {
                        outcome: c.outcome.clone(),
                        obstacle: c.obstacle.clone(),
                        plan: c.plan.clone(),
                        implementation_intention: c.implementation_intention(),
                        complete: c.is_complete(),
                    },
                )
            })
            .collect();

        Ok(Self {
            session_id: session.id().to_string(),
            created_at: session.created_at(),
            consent: session.consent(),
            demographics: session.demographics().cloned(),
            ranked_values,
            top_values,
            transcript: session.transcript().to_string(),
            word_count: word_count(session.transcript()),
            commitments,
            definitions: session.definitions().clone(),
            share_slug: session.share_slug().map(str::to_string),
        })
    }
}
