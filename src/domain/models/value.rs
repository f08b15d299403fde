//! Value catalog domain model.
//!
//! The catalog is the fixed deck of value cards every session sorts. It is
//! loaded once at startup and validated to contain exactly
//! [`CATALOG_SIZE`] unique entries; anything else is a startup failure.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::errors::{DomainError, DomainResult};

/// Number of values every catalog must contain.
pub const CATALOG_SIZE: usize = 52;

/// A catalog value card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Value {
    /// Stable slug
    pub id: String,
    /// Display name
    pub name: String,
    /// One-line description shown on the card
    pub short_description: String,
}

/// A value the user typed in themselves.
///
/// At most one exists per session and it is always filed as very important.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomValue {
    pub id: String,
    pub name: String,
}

/// Minimal view of a value handed to collaborators (generation, rendering).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueRef {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
}

impl From<&Value> for ValueRef {
    fn from(value: &Value) -> Self {
        Self {
            id: value.id.clone(),
            name: value.name.clone(),
            short_description: Some(value.short_description.clone()),
        }
    }
}

impl From<&CustomValue> for ValueRef {
    fn from(value: &CustomValue) -> Self {
        Self {
            id: value.id.clone(),
            name: value.name.clone(),
            short_description: None,
        }
    }
}

const BUILTIN_VALUES: [(&str, &str, &str); CATALOG_SIZE] = [
    ("acceptance", "Acceptance", "Embracing people and circumstances as they are"),
    ("achievement", "Achievement", "Accomplishing meaningful goals"),
    ("adventure", "Adventure", "Seeking new and exciting experiences"),
    ("authenticity", "Authenticity", "Being true to who you are"),
    ("autonomy", "Autonomy", "Directing your own life and choices"),
    ("balance", "Balance", "Keeping the parts of life in healthy proportion"),
    ("beauty", "Beauty", "Appreciating and creating what is beautiful"),
    ("belonging", "Belonging", "Feeling part of something larger than yourself"),
    ("care", "Care", "Looking after the wellbeing of others"),
    ("challenge", "Challenge", "Testing yourself against difficult things"),
    ("community", "Community", "Contributing to the people around you"),
    ("compassion", "Compassion", "Feeling and acting on concern for suffering"),
    ("competence", "Competence", "Being capable and effective"),
    ("courage", "Courage", "Acting despite fear or uncertainty"),
    ("creativity", "Creativity", "Making new things and new ideas"),
    ("curiosity", "Curiosity", "Exploring, questioning and wondering"),
    ("dependability", "Dependability", "Being someone others can count on"),
    ("equality", "Equality", "Giving everyone the same standing"),
    ("excellence", "Excellence", "Doing things to a high standard"),
    ("fairness", "Fairness", "Treating people impartially"),
    ("faith", "Faith", "Living by spiritual or religious beliefs"),
    ("family", "Family", "Nurturing the people closest to you"),
    ("forgiveness", "Forgiveness", "Letting go of resentment"),
    ("freedom", "Freedom", "Having the liberty to think and act"),
    ("friendship", "Friendship", "Building close, supportive relationships"),
    ("fun", "Fun", "Enjoying play and lightness"),
    ("generosity", "Generosity", "Giving freely of time and resources"),
    ("gratitude", "Gratitude", "Noticing and appreciating what you have"),
    ("growth", "Growth", "Continually developing as a person"),
    ("health", "Health", "Caring for your body and mind"),
    ("honesty", "Honesty", "Telling the truth and being transparent"),
    ("humility", "Humility", "Keeping a modest view of your own importance"),
    ("humor", "Humor", "Finding and sharing what is funny"),
    ("independence", "Independence", "Relying on yourself"),
    ("integrity", "Integrity", "Acting in line with your principles"),
    ("justice", "Justice", "Standing up for what is right"),
    ("kindness", "Kindness", "Being warm and considerate toward others"),
    ("knowledge", "Knowledge", "Understanding how things work"),
    ("leadership", "Leadership", "Guiding and inspiring others"),
    ("learning", "Learning", "Acquiring new skills and insight"),
    ("love", "Love", "Giving and receiving deep affection"),
    ("loyalty", "Loyalty", "Standing by people and commitments"),
    ("mindfulness", "Mindfulness", "Being present and aware"),
    ("openness", "Openness", "Being receptive to new ideas and people"),
    ("perseverance", "Perseverance", "Keeping going when things get hard"),
    ("purpose", "Purpose", "Living with a clear sense of direction"),
    ("recognition", "Recognition", "Being acknowledged for your contributions"),
    ("respect", "Respect", "Honoring the dignity of others"),
    ("responsibility", "Responsibility", "Owning your actions and duties"),
    ("security", "Security", "Having stability and safety"),
    ("service", "Service", "Helping others and the wider world"),
    ("wisdom", "Wisdom", "Applying experience and judgment well"),
];

/// The immutable value deck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueCatalog {
    values: Vec<Value>,
}

#[derive(Deserialize)]
struct CatalogFile {
    values: Vec<Value>,
}

impl ValueCatalog {
    /// The built-in catalog.
    pub fn builtin() -> DomainResult<Self> {
        Self::from_values(
            BUILTIN_VALUES
                .iter()
                .map(|(id, name, description)| Value {
                    id: (*id).to_string(),
                    name: (*name).to_string(),
                    short_description: (*description).to_string(),
                })
                .collect(),
        )
    }

    /// Build a catalog, enforcing size and id uniqueness.
    pub fn from_values(values: Vec<Value>) -> DomainResult<Self> {
        if values.len() != CATALOG_SIZE {
            return Err(DomainError::CatalogSize {
                expected: CATALOG_SIZE,
                actual: values.len(),
            });
        }

        let mut seen = HashSet::with_capacity(values.len());
        for value in &values {
            if !seen.insert(value.id.as_str()) {
                return Err(DomainError::DuplicateCatalogId(value.id.clone()));
            }
        }

        Ok(Self { values })
    }

    /// Parse a catalog from YAML of the form `values: [{id, name, short_description}]`.
    pub fn from_yaml_str(yaml: &str) -> DomainResult<Self> {
        let file: CatalogFile = serde_yaml::from_str(yaml)
            .map_err(|e| DomainError::SerializationError(e.to_string()))?;
        Self::from_values(file.values)
    }

    /// Load from an optional catalog file, falling back to the built-in deck.
    pub fn load(path: Option<&Path>) -> DomainResult<Self> {
        match path {
            Some(path) => {
                let yaml = std::fs::read_to_string(path).map_err(|e| {
                    DomainError::ValidationFailed(format!(
                        "Failed to read catalog {}: {e}",
                        path.display()
                    ))
                })?;
                Self::from_yaml_str(&yaml)
            }
            None => Self::builtin(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Value> {
        self.values.iter().find(|v| v.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Ids in catalog order.
    pub fn ids(&self) -> Vec<String> {
        self.values.iter().map(|v| v.id.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
