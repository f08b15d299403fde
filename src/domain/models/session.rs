//! Assessment session aggregate.
//!
//! A session owns the whole working state of one assessment: the sort ledger,
//! the selection and ranking derived from it, the story, commitments and
//! definitions. Every mutating method validates first and only then changes
//! state, so an `Err` always leaves the session untouched.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::config::AssessmentConfig;
use super::definition::{Definition, DefinitionEdit, GeneratedDefinition};
use super::ledger::{Category, SortLedger, UndoOutcome};
use super::narrative::{Commitment, CommitmentUpdate, StoryStatus};
use super::selection::{self, SelectionPlan};
use super::value::{CustomValue, ValueCatalog, ValueRef};
use crate::domain::errors::{DomainError, DomainResult};

/// Step of the assessment a user should be looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No session has been started
    Welcome,
    /// Sorting cards into categories
    Sort,
    /// Selecting and ranking the top values
    Select,
    /// Recording the story
    Story,
    /// Outcome / obstacle / plan per top value
    Goals,
    /// Definitions, export and sharing
    Share,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::Sort => "sort",
            Self::Select => "select",
            Self::Story => "story",
            Self::Goals => "goals",
            Self::Share => "share",
        }
    }
}

/// Optional self-reported demographics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demographics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
}

/// The root aggregate of an assessment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    id: String,
    created_at: Option<DateTime<Utc>>,
    consent: bool,
    demographics: Option<Demographics>,
    ledger: SortLedger,
    selection: Vec<String>,
    ranking: Vec<String>,
    transcript: String,
    commitments: BTreeMap<String, Commitment>,
    definitions: BTreeMap<String, Definition>,
    share_slug: Option<String>,
}

impl Session {
    /// Fresh session over a fixed presentation order.
    pub fn new(id: impl Into<String>, order: Vec<String>) -> Self {
        Self {
            id: id.into(),
            created_at: Some(Utc::now()),
            ledger: SortLedger::new(order),
            ..Self::default()
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn consent(&self) -> bool {
        self.consent
    }

    pub fn demographics(&self) -> Option<&Demographics> {
        self.demographics.as_ref()
    }

    pub fn ledger(&self) -> &SortLedger {
        &self.ledger
    }

    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    pub fn ranking(&self) -> &[String] {
        &self.ranking
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn commitments(&self) -> &BTreeMap<String, Commitment> {
        &self.commitments
    }

    pub fn commitment(&self, value_id: &str) -> Option<&Commitment> {
        self.commitments.get(value_id)
    }

    pub fn definitions(&self) -> &BTreeMap<String, Definition> {
        &self.definitions
    }

    pub fn definition(&self, value_id: &str) -> Option<&Definition> {
        self.definitions.get(value_id)
    }

    pub fn share_slug(&self) -> Option<&str> {
        self.share_slug.as_deref()
    }

    pub fn is_started(&self) -> bool {
        !self.id.is_empty() && !self.ledger.order().is_empty()
    }

    fn require_started(&self) -> DomainResult<()> {
        if self.is_started() {
            Ok(())
        } else {
            Err(DomainError::SessionNotStarted)
        }
    }

    fn require_sorted(&self) -> DomainResult<()> {
        self.require_started()?;
        if self.ledger.is_complete() {
            Ok(())
        } else {
            Err(DomainError::SortingIncomplete {
                cursor: self.ledger.cursor(),
                total: self.ledger.total(),
            })
        }
    }

    pub fn set_consent(&mut self, consent: bool) -> DomainResult<()> {
        self.require_started()?;
        self.consent = consent;
        Ok(())
    }

    pub fn set_demographics(&mut self, demographics: Demographics) -> DomainResult<()> {
        self.require_started()?;
        self.demographics = Some(demographics);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Sorting
    // ------------------------------------------------------------------

    pub fn assign(&mut self, value_id: &str, category: Category) -> DomainResult<()> {
        self.require_started()?;
        self.ledger.assign(value_id, category)
    }

    pub fn assign_current(&mut self, category: Category) -> DomainResult<String> {
        self.require_started()?;
        self.ledger.assign_current(category)
    }

    /// Undo the last assignment.
    ///
    /// If the reverted value had been selected the selection and ranking are
    /// dropped, since they are no longer drawn from `very`.
    pub fn undo(&mut self) -> UndoOutcome {
        let outcome = self.ledger.undo();
        let reverted = match &outcome {
            UndoOutcome::Reverted { value_id, .. } | UndoOutcome::Orphaned { value_id } => {
                Some(value_id.as_str())
            }
            UndoOutcome::Nothing => None,
        };

        if let Some(value_id) = reverted {
            if self.selection.iter().any(|id| id == value_id) {
                tracing::info!(%value_id, "undone value was selected; clearing selection and ranking");
                self.selection.clear();
                self.ranking.clear();
            }
        }

        outcome
    }

    pub fn add_custom_value(&mut self, name: &str) -> DomainResult<CustomValue> {
        self.require_started()?;
        self.ledger.add_custom_value(name).cloned()
    }

    // ------------------------------------------------------------------
    // Selection & ranking
    // ------------------------------------------------------------------

    pub fn selection_plan(&self, rules: &AssessmentConfig) -> SelectionPlan {
        selection::plan_selection(self.ledger.very(), rules.selection_size, rules.top_count)
    }

    /// Number of values a selection must contain given the current `very` set.
    pub fn selection_target(&self, rules: &AssessmentConfig) -> usize {
        selection::selection_target(self.ledger.very().len(), rules.selection_size, rules.top_count)
    }

    /// Apply the exactly-k shortcut, where k is `selection_size` or `top_count`.
    /// Returns true when the selection changed.
    pub fn auto_select(&mut self, rules: &AssessmentConfig) -> DomainResult<bool> {
        self.require_sorted()?;
        match self.selection_plan(rules) {
            SelectionPlan::AutoSelected { values } => {
                if selection::same_members(&values, &self.selection) {
                    return Ok(false);
                }
                self.ranking.clear();
                self.selection = values;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Select exactly `k` distinct values from `very`.
    ///
    /// A selection with different members invalidates the ranking.
    pub fn select_top_k(&mut self, ids: Vec<String>, k: usize) -> DomainResult<()> {
        self.require_sorted()?;
        selection::validate_selection(&ids, self.ledger.very(), k)?;

        if !selection::same_members(&ids, &self.selection) {
            self.ranking.clear();
        }
        self.selection = ids;
        Ok(())
    }

    /// Set the authoritative order of the selection.
    pub fn set_ranking(&mut self, ids: Vec<String>) -> DomainResult<()> {
        self.require_started()?;
        selection::validate_ranking(&ids, &self.selection)?;
        self.ranking = ids;
        Ok(())
    }

    fn ranking_mut(&mut self) -> DomainResult<&mut Vec<String>> {
        if self.ranking.is_empty() {
            return Err(DomainError::NoRanking);
        }
        Ok(&mut self.ranking)
    }

    pub fn move_ranked_up(&mut self, index: usize) -> DomainResult<bool> {
        selection::move_up(self.ranking_mut()?, index)
    }

    pub fn move_ranked_down(&mut self, index: usize) -> DomainResult<bool> {
        selection::move_down(self.ranking_mut()?, index)
    }

    pub fn move_ranked(&mut self, from: usize, to: usize) -> DomainResult<bool> {
        selection::move_item(self.ranking_mut()?, from, to)
    }

    /// The first `top_count` ranked values.
    pub fn top_values(&self, rules: &AssessmentConfig) -> &[String] {
        let n = rules.top_count.min(self.ranking.len());
        &self.ranking[..n]
    }

    fn require_top_value(&self, value_id: &str, rules: &AssessmentConfig) -> DomainResult<()> {
        if self.top_values(rules).iter().any(|id| id == value_id) {
            Ok(())
        } else {
            Err(DomainError::NotATopValue(value_id.to_string()))
        }
    }

    // ------------------------------------------------------------------
    // Story & commitments
    // ------------------------------------------------------------------

    /// Store the transcript verbatim. Word limits gate progression, not storage.
    pub fn set_transcript(&mut self, text: impl Into<String>) -> DomainResult<usize> {
        self.require_started()?;
        self.transcript = text.into();
        Ok(super::narrative::word_count(&self.transcript))
    }

    pub fn story_status(&self, rules: &AssessmentConfig) -> StoryStatus {
        StoryStatus::new(&self.transcript, rules.min_story_words, rules.max_story_words)
    }

    pub fn set_commitment(
        &mut self,
        value_id: &str,
        update: CommitmentUpdate,
        rules: &AssessmentConfig,
    ) -> DomainResult<&Commitment> {
        self.require_top_value(value_id, rules)?;
        if update.is_empty() {
            return Err(DomainError::ValidationFailed(
                "commitment update has no fields".to_string(),
            ));
        }

        let commitment = self.commitments.entry(value_id.to_string()).or_default();
        commitment.apply(update);
        Ok(&*commitment)
    }

    // ------------------------------------------------------------------
    // Definitions
    // ------------------------------------------------------------------

    /// Store generated definitions. User-edited definitions are kept unless
    /// `overwrite_edited` is set. Returns the ids that were written.
    pub fn apply_definitions(
        &mut self,
        generated: &BTreeMap<String, GeneratedDefinition>,
        overwrite_edited: bool,
    ) -> Vec<String> {
        let mut applied = Vec::new();
        for (value_id, result) in generated {
            let keep_existing = self
                .definitions
                .get(value_id)
                .is_some_and(|existing| existing.user_edited && !overwrite_edited);
            if keep_existing {
                tracing::debug!(%value_id, "keeping user-edited definition");
                continue;
            }

            let mut definition = result.definition.clone();
            definition.user_edited = false;
            self.definitions.insert(value_id.clone(), definition);
            applied.push(value_id.clone());
        }
        applied
    }

    pub fn edit_definition(
        &mut self,
        value_id: &str,
        edit: DefinitionEdit,
        rules: &AssessmentConfig,
    ) -> DomainResult<&Definition> {
        self.require_top_value(value_id, rules)?;
        if edit.is_empty() {
            return Err(DomainError::ValidationFailed(
                "definition edit has no fields".to_string(),
            ));
        }
        if edit.tagline.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(DomainError::ValidationFailed(
                "tagline cannot be empty".to_string(),
            ));
        }
        if edit.tagline.is_none() && !self.definitions.contains_key(value_id) {
            return Err(DomainError::ValidationFailed(
                "a new definition needs a tagline".to_string(),
            ));
        }

        let definition = self.definitions.entry(value_id.to_string()).or_default();
        definition.edit(edit);
        Ok(&*definition)
    }

    pub fn record_share_slug(&mut self, slug: impl Into<String>) -> DomainResult<()> {
        self.require_started()?;
        self.share_slug = Some(slug.into());
        Ok(())
    }

    // ------------------------------------------------------------------
    // Resumability
    // ------------------------------------------------------------------

    /// Sorting unfinished or nothing ranked yet.
    pub fn is_in_progress(&self) -> bool {
        !self.ledger.is_complete() || self.ranking.is_empty()
    }

    /// Where a returning user should land.
    pub fn resume_route(&self, rules: &AssessmentConfig) -> Phase {
        if !self.is_started() {
            return Phase::Welcome;
        }
        if !self.ledger.is_complete() {
            return Phase::Sort;
        }
        if self.ranking.is_empty() {
            return Phase::Select;
        }
        if !self.story_status(rules).meets_requirements() {
            return Phase::Story;
        }
        let goals_pending = self
            .top_values(rules)
            .iter()
            .any(|id| !self.commitments.get(id).is_some_and(Commitment::is_complete));
        if goals_pending {
            return Phase::Goals;
        }
        Phase::Share
    }

    /// Resolve an id against the catalog or this session's custom value.
    pub fn value_ref(&self, catalog: &ValueCatalog, value_id: &str) -> Option<ValueRef> {
        if let Some(value) = catalog.get(value_id) {
            return Some(ValueRef::from(value));
        }
        self.ledger
            .custom()
            .filter(|custom| custom.id == value_id)
            .map(ValueRef::from)
    }

    /// Structural checks applied to state read back from storage.
    pub fn check_invariants(&self) -> Result<(), String> {
        self.ledger.check_invariants()?;

        let very = self.ledger.very();
        if let Some(id) = self.selection.iter().find(|id| !very.contains(id)) {
            return Err(format!("selected value {id} is not very important"));
        }
        if !self.ranking.is_empty()
            && selection::validate_ranking(&self.ranking, &self.selection).is_err()
        {
            return Err("ranking is not a permutation of the selection".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> AssessmentConfig {
        AssessmentConfig {
            selection_size: 3,
            top_count: 2,
            min_story_words: 3,
            max_story_words: 10,
            catalog_path: None,
        }
    }

    fn order(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| (*s).to_string()).collect()
    }

    fn sorted_session() -> Session {
        let mut s = Session::new("s1", order(&["a", "b", "c", "d", "e"]));
        for (id, cat) in [
            ("a", Category::Very),
            ("b", Category::Less),
            ("c", Category::Very),
            ("d", Category::Very),
            ("e", Category::Somewhat),
        ] {
            s.assign(id, cat).unwrap();
        }
        s
    }

    fn ranked_session() -> Session {
        let mut s = sorted_session();
        assert!(s.auto_select(&rules()).unwrap());
        s.set_ranking(order(&["d", "a", "c"])).unwrap();
        s
    }

    #[test]
    fn test_sorting_scenario_routes_to_select() {
        let s = sorted_session();
        assert_eq!(s.ledger().very(), ["a", "c", "d"]);
        assert_eq!(s.ledger().cursor(), 5);
        assert!(s.is_in_progress());
        assert_eq!(s.resume_route(&rules()), Phase::Select);
    }

    #[test]
    fn test_unstarted_session_routes_to_welcome() {
        let s = Session::default();
        assert_eq!(s.resume_route(&rules()), Phase::Welcome);
        let mut s = s;
        assert!(matches!(s.assign("a", Category::Very), Err(DomainError::SessionNotStarted)));
    }

    #[test]
    fn test_select_requires_complete_sort() {
        let mut s = Session::new("s1", order(&["a", "b"]));
        s.assign("a", Category::Very).unwrap();
        assert!(matches!(
            s.select_top_k(order(&["a"]), 1),
            Err(DomainError::SortingIncomplete { cursor: 1, total: 2 })
        ));
    }

    #[test]
    fn test_reselect_with_new_members_clears_ranking() {
        let mut s = Session::new("s1", order(&["a", "b", "c"]));
        for id in ["a", "b", "c"] {
            s.assign(id, Category::Very).unwrap();
        }
        s.select_top_k(order(&["a", "b"]), 2).unwrap();
        s.set_ranking(order(&["b", "a"])).unwrap();

        s.select_top_k(order(&["a", "b"]), 2).unwrap();
        assert_eq!(s.ranking(), ["b", "a"]);

        s.select_top_k(order(&["a", "c"]), 2).unwrap();
        assert!(s.ranking().is_empty());
    }

    #[test]
    fn test_routing_through_later_phases() {
        let mut s = ranked_session();
        let rules = rules();
        assert!(!s.is_in_progress());
        assert_eq!(s.resume_route(&rules), Phase::Story);

        s.set_transcript("one two three four").unwrap();
        assert_eq!(s.resume_route(&rules), Phase::Goals);

        for id in ["d", "a"] {
            s.set_commitment(
                id,
                CommitmentUpdate::default().outcome("o").obstacle("x").plan("p"),
                &rules,
            )
            .unwrap();
        }
        assert_eq!(s.resume_route(&rules), Phase::Share);
    }

    #[test]
    fn test_commitment_only_for_top_values() {
        let mut s = ranked_session();
        let err = s
            .set_commitment("c", CommitmentUpdate::default().outcome("o"), &rules())
            .unwrap_err();
        assert!(matches!(err, DomainError::NotATopValue(id) if id == "c"));
        assert!(s.commitments().is_empty());
    }

    #[test]
    fn test_undo_of_selected_value_clears_selection() {
        let mut s = ranked_session();
        s.undo();
        assert_eq!(s.ranking(), ["d", "a", "c"]);
        s.undo();
        assert_eq!(s.ledger().cursor(), 3);
        assert!(s.selection().is_empty());
        assert!(s.ranking().is_empty());
        assert_eq!(s.resume_route(&rules()), Phase::Sort);
    }

    #[test]
    fn test_undo_of_unselected_value_keeps_selection() {
        let mut s = ranked_session();
        // last card "e" went to somewhat and is not selected
        let outcome = s.undo();
        assert!(matches!(outcome, UndoOutcome::Reverted { ref value_id, .. } if value_id == "e"));
        assert_eq!(s.ranking(), ["d", "a", "c"]);
    }

    #[test]
    fn test_user_edited_definition_survives_regeneration() {
        let mut s = ranked_session();
        let rules = rules();
        s.edit_definition(
            "d",
            DefinitionEdit {
                tagline: Some("Mine".to_string()),
                ..Default::default()
            },
            &rules,
        )
        .unwrap();

        let mut generated = BTreeMap::new();
        for id in ["d", "a"] {
            generated.insert(
                id.to_string(),
                GeneratedDefinition {
                    definition: Definition {
                        tagline: format!("Generated {id}"),
                        ..Default::default()
                    },
                    fallback: true,
                },
            );
        }

        let applied = s.apply_definitions(&generated, false);
        assert_eq!(applied, vec!["a".to_string()]);
        assert_eq!(s.definition("d").unwrap().tagline, "Mine");
        assert!(s.definition("d").unwrap().user_edited);

        let applied = s.apply_definitions(&generated, true);
        assert_eq!(applied.len(), 2);
        assert_eq!(s.definition("d").unwrap().tagline, "Generated d");
        assert!(!s.definition("d").unwrap().user_edited);
    }

    #[test]
    fn test_ranking_moves() {
        let mut s = ranked_session();
        assert!(!s.move_ranked_up(0).unwrap());
        assert!(s.move_ranked_down(0).unwrap());
        assert_eq!(s.ranking(), ["a", "d", "c"]);
        assert!(s.move_ranked(2, 0).unwrap());
        assert_eq!(s.ranking(), ["c", "a", "d"]);

        let mut empty = sorted_session();
        assert!(matches!(empty.move_ranked_up(1), Err(DomainError::NoRanking)));
    }

    #[test]
    fn test_invariant_check_on_valid_session() {
        let s = ranked_session();
        assert!(s.check_invariants().is_ok());
    }
}
