//! Selection and ranking resolution.
//!
//! Selection picks exactly `k` values out of the ledger's `very` sequence;
//! ranking orders a selection. Both are plain functions over slices so the
//! session can validate before it mutates.

use std::collections::HashSet;

use serde::Serialize;

use crate::domain::errors::{DomainError, DomainResult};

/// How the selection step should be handled for the current `very` set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "plan", rename_all = "snake_case")]
pub enum SelectionPlan {
    /// Exactly `k` values are very important; no choice needed, only ranking.
    AutoSelected { values: Vec<String> },
    /// More than `k` candidates; the user picks `pick` of them.
    Choose { candidates: Vec<String>, pick: usize },
    /// Too few very important values to select from.
    Insufficient { have: usize, need: usize },
}

/// How many values to pick out of `very` for a session.
///
/// The full flow picks `selection_size`. When fewer are very important but
/// at least `top_count` are, the shorter top-only flow picks `top_count`.
pub fn selection_target(very_len: usize, selection_size: usize, top_count: usize) -> usize {
    if very_len >= selection_size {
        selection_size
    } else {
        top_count
    }
}

pub fn plan_selection(very: &[String], selection_size: usize, top_count: usize) -> SelectionPlan {
    let k = selection_target(very.len(), selection_size, top_count);
    match very.len().cmp(&k) {
        std::cmp::Ordering::Equal => SelectionPlan::AutoSelected {
            values: very.to_vec(),
        },
        std::cmp::Ordering::Greater => SelectionPlan::Choose {
            candidates: very.to_vec(),
            pick: k,
        },
        std::cmp::Ordering::Less => SelectionPlan::Insufficient {
            have: very.len(),
            need: k,
        },
    }
}

fn ensure_unique(ids: &[String]) -> DomainResult<()> {
    let mut seen = HashSet::with_capacity(ids.len());
    for id in ids {
        if !seen.insert(id.as_str()) {
            return Err(DomainError::DuplicateValue(id.clone()));
        }
    }
    Ok(())
}

/// `ids` must be `k` distinct members of `very`.
pub fn validate_selection(ids: &[String], very: &[String], k: usize) -> DomainResult<()> {
    if ids.len() != k {
        return Err(DomainError::WrongSelectionSize {
            expected: k,
            actual: ids.len(),
        });
    }
    ensure_unique(ids)?;
    if let Some(missing) = ids.iter().find(|id| !very.contains(id)) {
        return Err(DomainError::NotVeryImportant(missing.clone()));
    }
    Ok(())
}

/// `ids` must be a permutation of `selection`.
pub fn validate_ranking(ids: &[String], selection: &[String]) -> DomainResult<()> {
    if selection.is_empty() {
        return Err(DomainError::NoSelection);
    }
    if ids.len() != selection.len() {
        return Err(DomainError::WrongSelectionSize {
            expected: selection.len(),
            actual: ids.len(),
        });
    }
    ensure_unique(ids)?;
    if ids.iter().any(|id| !selection.contains(id)) {
        return Err(DomainError::NotASelectionPermutation);
    }
    Ok(())
}

/// True if both slices hold the same ids regardless of order.
pub fn same_members(a: &[String], b: &[String]) -> bool {
    a.len() == b.len() && a.iter().all(|id| b.contains(id))
}

/// Swap the item at `index` with its predecessor. No-op at the top.
pub fn move_up(list: &mut [String], index: usize) -> DomainResult<bool> {
    if index >= list.len() {
        return Err(DomainError::PositionOutOfRange { index, len: list.len() });
    }
    if index == 0 {
        return Ok(false);
    }
    list.swap(index - 1, index);
    Ok(true)
}

/// Swap the item at `index` with its successor. No-op at the bottom.
pub fn move_down(list: &mut [String], index: usize) -> DomainResult<bool> {
    if index >= list.len() {
        return Err(DomainError::PositionOutOfRange { index, len: list.len() });
    }
    if index + 1 == list.len() {
        return Ok(false);
    }
    list.swap(index, index + 1);
    Ok(true)
}

/// Move the item at `from` to `to`, clamping `to` into range.
pub fn move_item(list: &mut Vec<String>, from: usize, to: usize) -> DomainResult<bool> {
    if from >= list.len() {
        return Err(DomainError::PositionOutOfRange { index: from, len: list.len() });
    }
    let to = to.min(list.len() - 1);
    if from == to {
        return Ok(false);
    }
    let item = list.remove(from);
    list.insert(to, item);
    Ok(true)
}
