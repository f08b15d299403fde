//! Share artifact domain model.
//!
//! A share artifact is the durable, publicly addressable copy of a user's top
//! values. It is denormalized on purpose: once written it no longer depends on
//! the working session, which may be reset or discarded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::snapshot::SessionSnapshot;
use crate::domain::errors::{DomainError, DomainResult};

/// Length of generated share slugs.
pub const SLUG_LEN: usize = 10;

/// One shared top value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedValue {
    pub value_id: String,
    pub name: String,
    pub tagline: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(default)]
    pub behavioral_anchors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareArtifact {
    pub slug: String,
    pub session_id: String,
    pub values: Vec<SharedValue>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A fresh random slug.
pub fn generate_slug() -> String {
    Uuid::new_v4().simple().to_string()[..SLUG_LEN].to_string()
}

/// Denormalize the top values of a snapshot.
///
/// Every top value needs a definition; publishing without them is a
/// precondition failure.
pub fn shared_values(snapshot: &SessionSnapshot) -> DomainResult<Vec<SharedValue>> {
    if snapshot.top_values.is_empty() {
        return Err(DomainError::NoRanking);
    }

    snapshot
        .top_values
        .iter()
        .map(|value| {
            let definition = snapshot.definitions.get(&value.id).ok_or_else(|| {
                DomainError::PreconditionFailed(format!(
                    "no definition for {}; generate definitions first",
                    value.id
                ))
            })?;
            Ok(SharedValue {
                value_id: value.id.clone(),
                name: value.name.clone(),
                tagline: definition.tagline.clone(),
                definition: definition.definition.clone(),
                behavioral_anchors: definition.behavioral_anchors.clone().unwrap_or_default(),
            })
        })
        .collect()
}

impl ShareArtifact {
    pub fn new(slug: impl Into<String>, snapshot: &SessionSnapshot) -> DomainResult<Self> {
        let now = Utc::now();
        Ok(Self {
            slug: slug.into(),
            session_id: snapshot.session_id.clone(),
            values: shared_values(snapshot)?,
            created_at: now,
            updated_at: now,
        })
    }

    /// Refresh the denormalized values from a newer snapshot.
    pub fn refresh(&mut self, snapshot: &SessionSnapshot) -> DomainResult<()> {
        self.values = shared_values(snapshot)?;
        self.updated_at = Utc::now();
        Ok(())
    }
}
