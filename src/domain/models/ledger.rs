//! Category assignment ledger.
//!
//! The ledger records the card sort: values are presented in a fixed shuffled
//! order and each one is filed into exactly one [`Category`]. The cursor is
//! the index of the current card and always equals the number of catalog
//! values that have been filed.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::value::CustomValue;
use crate::domain::errors::{DomainError, DomainResult, NameConstraint};

pub const CUSTOM_NAME_MIN_CHARS: usize = 2;
pub const CUSTOM_NAME_MAX_CHARS: usize = 30;

/// Bucket a value can be sorted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Very important to me
    Very,
    /// Somewhat important to me
    Somewhat,
    /// Less important to me
    Less,
}

impl Category {
    pub const ALL: [Self; 3] = [Self::Very, Self::Somewhat, Self::Less];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Very => "very",
            Self::Somewhat => "somewhat",
            Self::Less => "less",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "very" => Some(Self::Very),
            "somewhat" => Some(Self::Somewhat),
            "less" => Some(Self::Less),
            _ => None,
        }
    }
}

/// What an undo actually did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UndoOutcome {
    /// Cursor was already at the first card.
    Nothing,
    /// The last filed value was removed from its category.
    Reverted { value_id: String, category: Category },
    /// The cursor moved back but the value was not filed anywhere.
    Orphaned { value_id: String },
}

/// Validate and normalize a custom value name.
pub fn validate_custom_name(name: &str) -> Result<String, NameConstraint> {
    let trimmed = name.trim();
    let len = trimmed.chars().count();

    if len < CUSTOM_NAME_MIN_CHARS {
        return Err(NameConstraint::TooShort { min: CUSTOM_NAME_MIN_CHARS });
    }
    if len > CUSTOM_NAME_MAX_CHARS {
        return Err(NameConstraint::TooLong { max: CUSTOM_NAME_MAX_CHARS });
    }
    if !trimmed.chars().all(|c| c.is_alphabetic() || c == ' ') {
        return Err(NameConstraint::LettersAndSpacesOnly);
    }

    Ok(trimmed.to_string())
}

/// Three disjoint ordered sequences plus the presentation order and cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortLedger {
    order: Vec<String>,
    cursor: usize,
    #[serde(default)]
    very: Vec<String>,
    #[serde(default)]
    somewhat: Vec<String>,
    #[serde(default)]
    less: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    custom: Option<CustomValue>,
}

impl SortLedger {
    /// Empty ledger over a fixed presentation order.
    pub fn new(order: Vec<String>) -> Self {
        Self {
            order,
            ..Self::default()
        }
    }

    pub fn order(&self) -> &[String] {
        &self.order
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn total(&self) -> usize {
        self.order.len()
    }

    /// True once every card has been filed.
    pub fn is_complete(&self) -> bool {
        self.cursor == self.order.len()
    }

    /// The card currently awaiting a decision.
    pub fn current(&self) -> Option<&str> {
        self.order.get(self.cursor).map(String::as_str)
    }

    pub fn remaining(&self) -> usize {
        self.order.len() - self.cursor
    }

    pub fn sequence(&self, category: Category) -> &[String] {
        match category {
            Category::Very => &self.very,
            Category::Somewhat => &self.somewhat,
            Category::Less => &self.less,
        }
    }

    fn sequence_mut(&mut self, category: Category) -> &mut Vec<String> {
        match category {
            Category::Very => &mut self.very,
            Category::Somewhat => &mut self.somewhat,
            Category::Less => &mut self.less,
        }
    }

    pub fn very(&self) -> &[String] {
        &self.very
    }

    pub fn somewhat(&self) -> &[String] {
        &self.somewhat
    }

    pub fn less(&self) -> &[String] {
        &self.less
    }

    pub fn custom(&self) -> Option<&CustomValue> {
        self.custom.as_ref()
    }

    /// Category currently holding `value_id`, if any.
    pub fn category_of(&self, value_id: &str) -> Option<Category> {
        Category::ALL
            .into_iter()
            .find(|c| self.sequence(*c).iter().any(|id| id == value_id))
    }

    /// Number of ids across all three sequences, the custom value included.
    pub fn filed_count(&self) -> usize {
        self.very.len() + self.somewhat.len() + self.less.len()
    }

    /// File the current card.
    ///
    /// `value_id` must be the card at the cursor; anything else is rejected
    /// without touching the ledger.
    pub fn assign(&mut self, value_id: &str, category: Category) -> DomainResult<()> {
        let expected = self.current().ok_or(DomainError::SortingComplete)?;
        if expected != value_id {
            return Err(DomainError::OutOfOrder {
                expected: expected.to_string(),
                actual: value_id.to_string(),
            });
        }

        self.sequence_mut(category).push(value_id.to_string());
        self.cursor += 1;
        tracing::debug!(value_id, category = category.as_str(), cursor = self.cursor, "value assigned");
        Ok(())
    }

    /// File whatever card is current.
    pub fn assign_current(&mut self, category: Category) -> DomainResult<String> {
        let value_id = self
            .current()
            .ok_or(DomainError::SortingComplete)?
            .to_string();
        self.assign(&value_id, category)?;
        Ok(value_id)
    }

    /// Step back one card.
    ///
    /// The value to revert is recovered from the presentation order, not from
    /// any timestamp. A value that was never filed is tolerated.
    pub fn undo(&mut self) -> UndoOutcome {
        if self.cursor == 0 {
            return UndoOutcome::Nothing;
        }

        let value_id = self.order[self.cursor - 1].clone();
        self.cursor -= 1;

        match self.category_of(&value_id) {
            Some(category) => {
                self.sequence_mut(category).retain(|id| id != &value_id);
                tracing::debug!(%value_id, category = category.as_str(), cursor = self.cursor, "assignment undone");
                UndoOutcome::Reverted { value_id, category }
            }
            None => {
                tracing::warn!(%value_id, cursor = self.cursor, "undo found no recorded assignment");
                UndoOutcome::Orphaned { value_id }
            }
        }
    }

    /// Add the session's single custom value straight into `very`.
    ///
    /// Does not consume a cursor slot.
    pub fn add_custom_value(&mut self, name: &str) -> DomainResult<&CustomValue> {
        if let Some(existing) = &self.custom {
            return Err(DomainError::CustomValueExists(existing.name.clone()));
        }

        let name = validate_custom_name(name).map_err(|constraint| {
            DomainError::InvalidCustomValueName {
                name: name.to_string(),
                constraint,
            }
        })?;

        let custom = CustomValue {
            id: format!("custom-{}", Uuid::new_v4().simple()),
            name,
        };
        self.very.push(custom.id.clone());
        tracing::debug!(value_id = %custom.id, name = %custom.name, "custom value added");

        Ok(&*self.custom.insert(custom))
    }

    /// Check the structural invariants; used when accepting persisted state.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.cursor > self.order.len() {
            return Err(format!(
                "cursor {} beyond order of {}",
                self.cursor,
                self.order.len()
            ));
        }

        let custom_id = self.custom.as_ref().map(|c| c.id.as_str());
        let mut seen = std::collections::HashSet::new();
        let mut sorted = 0usize;

        for category in Category::ALL {
            for id in self.sequence(category) {
                if !seen.insert(id.as_str()) {
                    return Err(format!("value {id} filed more than once"));
                }
                if Some(id.as_str()) == custom_id {
                    if category != Category::Very {
                        return Err(format!("custom value {id} outside very"));
                    }
                    continue;
                }
                if !self.order[..self.cursor].contains(id) {
                    return Err(format!("value {id} filed but not yet presented"));
                }
                sorted += 1;
            }
        }

        if let Some(id) = custom_id {
            if !seen.contains(id) {
                return Err(format!("custom value {id} missing from very"));
            }
        }

        if sorted != self.cursor {
            return Err(format!(
                "cursor {} does not match {sorted} filed values",
                self.cursor
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger(ids: &[&str]) -> SortLedger {
        SortLedger::new(ids.iter().map(|s| (*s).to_string()).collect())
    }

    #[test]
    fn test_assign_in_order() {
        let mut l = ledger(&["a", "b", "c"]);
        l.assign("a", Category::Very).unwrap();
        l.assign("b", Category::Less).unwrap();

        assert_eq!(l.cursor(), 2);
        assert_eq!(l.very(), ["a"]);
        assert_eq!(l.less(), ["b"]);
        assert_eq!(l.current(), Some("c"));
        assert!(!l.is_complete());
    }

    #[test]
    fn test_out_of_order_rejected() {
        let mut l = ledger(&["a", "b"]);
        let before = l.clone();
        let err = l.assign("b", Category::Very).unwrap_err();
        assert!(matches!(err, DomainError::OutOfOrder { expected, actual } if expected == "a" && actual == "b"));
        assert_eq!(l, before);
    }

    #[test]
    fn test_assign_after_complete() {
        let mut l = ledger(&["a"]);
        l.assign_current(Category::Somewhat).unwrap();
        assert!(l.is_complete());
        assert!(matches!(l.assign("a", Category::Very), Err(DomainError::SortingComplete)));
    }

    #[test]
    fn test_undo_reverts_last_assignment() {
        let mut l = ledger(&["a", "b"]);
        l.assign("a", Category::Very).unwrap();
        l.assign("b", Category::Somewhat).unwrap();

        let outcome = l.undo();
        assert_eq!(
            outcome,
            UndoOutcome::Reverted { value_id: "b".to_string(), category: Category::Somewhat }
        );
        assert_eq!(l.cursor(), 1);
        assert!(l.somewhat().is_empty());
    }

    #[test]
    fn test_undo_at_start_is_noop() {
        let mut l = ledger(&["a"]);
        assert_eq!(l.undo(), UndoOutcome::Nothing);
        assert_eq!(l.cursor(), 0);
    }

    #[test]
    fn test_undo_orphan_is_tolerated() {
        let mut l: SortLedger = serde_json::from_value(serde_json::json!({
            "order": ["a", "b"],
            "cursor": 1
        }))
        .unwrap();

        assert_eq!(l.undo(), UndoOutcome::Orphaned { value_id: "a".to_string() });
        assert_eq!(l.cursor(), 0);
    }

    #[test]
    fn test_custom_value_does_not_move_cursor() {
        let mut l = ledger(&["a", "b"]);
        l.assign("a", Category::Very).unwrap();
        let id = l.add_custom_value("  Patience ").unwrap().id.clone();

        assert_eq!(l.cursor(), 1);
        assert_eq!(l.very().len(), 2);
        assert_eq!(l.custom().unwrap().name, "Patience");
        assert_eq!(l.category_of(&id), Some(Category::Very));
        assert!(l.check_invariants().is_ok());
    }

    #[test]
    fn test_only_one_custom_value() {
        let mut l = ledger(&["a"]);
        l.add_custom_value("Patience").unwrap();
        assert!(matches!(
            l.add_custom_value("Grit"),
            Err(DomainError::CustomValueExists(name)) if name == "Patience"
        ));
    }

    #[test]
    fn test_custom_name_constraints() {
        assert_eq!(validate_custom_name("P"), Err(NameConstraint::TooShort { min: 2 }));
        assert_eq!(
            validate_custom_name(&"a".repeat(31)),
            Err(NameConstraint::TooLong { max: 30 })
        );
        assert_eq!(
            validate_custom_name("Grit2"),
            Err(NameConstraint::LettersAndSpacesOnly)
        );
        assert_eq!(validate_custom_name("Quiet Joy").unwrap(), "Quiet Joy");
    }

    #[test]
    fn test_invalid_custom_name_leaves_ledger_unchanged() {
        let mut l = ledger(&["a"]);
        let before = l.clone();
        let err = l.add_custom_value("no-dashes").unwrap_err();
        assert!(matches!(
            err,
            DomainError::InvalidCustomValueName { constraint: NameConstraint::LettersAndSpacesOnly, .. }
        ));
        assert_eq!(l, before);
    }

    #[test]
    fn test_invariants_detect_corruption() {
        let l: SortLedger = serde_json::from_value(serde_json::json!({
            "order": ["a", "b"],
            "cursor": 1,
            "very": ["a"],
            "less": ["a"]
        }))
        .unwrap();
        assert!(l.check_invariants().is_err());

        let l: SortLedger = serde_json::from_value(serde_json::json!({
            "order": ["a"],
            "cursor": 3
        }))
        .unwrap();
        assert!(l.check_invariants().is_err());
    }

    #[test]
    fn test_category_parse() {
        assert_eq!(Category::from_str("VERY"), Some(Category::Very));
        assert_eq!(Category::from_str("nope"), None);
        assert_eq!(Category::Less.as_str(), "less");
    }
}
