//! Personalized value definitions.

use serde::{Deserialize, Serialize};

/// Definition of one top value.
///
/// `user_edited` flips to true as soon as a person changes any field; an
/// edited definition is only replaced by regeneration when explicitly asked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub tagline: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behavioral_anchors: Option<Vec<String>>,
    #[serde(default)]
    pub user_edited: bool,
}

/// Result of generating one definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedDefinition {
    #[serde(flatten)]
    pub definition: Definition,
    /// True when produced by the deterministic local generator.
    pub fallback: bool,
}

/// Manual edit; `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionEdit {
    pub tagline: Option<String>,
    pub definition: Option<String>,
    pub behavioral_anchors: Option<Vec<String>>,
}

impl DefinitionEdit {
    pub fn is_empty(&self) -> bool {
        self.tagline.is_none() && self.definition.is_none() && self.behavioral_anchors.is_none()
    }
}

impl Definition {
    /// Apply a manual edit and mark the definition as user-edited.
    pub fn edit(&mut self, edit: DefinitionEdit) {
        if let Some(tagline) = edit.tagline {
            self.tagline = tagline;
        }
        if let Some(definition) = edit.definition {
            self.definition = Some(definition);
        }
        if let Some(anchors) = edit.behavioral_anchors {
            self.behavioral_anchors = Some(anchors);
        }
        self.user_edited = true;
    }
}
