//! Story transcript and per-value commitments (WOOP/VOOP).

use serde::{Deserialize, Serialize};

/// Number of whitespace-separated words in `text`.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Where a transcript stands against the story word limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoryStatus {
    pub word_count: usize,
    pub min_words: usize,
    pub max_words: usize,
}

impl StoryStatus {
    pub fn new(text: &str, min_words: usize, max_words: usize) -> Self {
        Self {
            word_count: word_count(text),
            min_words,
            max_words,
        }
    }

    pub fn is_too_short(&self) -> bool {
        self.word_count < self.min_words
    }

    pub fn is_too_long(&self) -> bool {
        self.word_count > self.max_words
    }

    /// True when the story gate allows moving on.
    pub fn meets_requirements(&self) -> bool {
        !self.is_too_short() && !self.is_too_long()
    }
}

/// Outcome / obstacle / plan for one top value.
///
/// Fields are filled incrementally; an empty string means "not yet chosen".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitment {
    #[serde(default)]
    pub outcome: String,
    #[serde(default)]
    pub obstacle: String,
    #[serde(default)]
    pub plan: String,
}

/// Partial update to a [`Commitment`]. `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitmentUpdate {
    pub outcome: Option<String>,
    pub obstacle: Option<String>,
    pub plan: Option<String>,
}

impl CommitmentUpdate {
    pub fn outcome(mut self, outcome: impl Into<String>) -> Self {
        self.outcome = Some(outcome.into());
        self
    }

    pub fn obstacle(mut self, obstacle: impl Into<String>) -> Self {
        self.obstacle = Some(obstacle.into());
        self
    }

    pub fn plan(mut self, plan: impl Into<String>) -> Self {
        self.plan = Some(plan.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.outcome.is_none() && self.obstacle.is_none() && self.plan.is_none()
    }
}

impl Commitment {
    /// Apply a partial update.
    ///
    /// A plan answers one specific obstacle, so choosing a different obstacle
    /// clears the plan unless the same update also supplies a new one.
    pub fn apply(&mut self, update: CommitmentUpdate) {
        if let Some(outcome) = update.outcome {
            self.outcome = outcome.trim().to_string();
        }
        if let Some(obstacle) = update.obstacle {
            let obstacle = obstacle.trim().to_string();
            if obstacle != self.obstacle {
                self.plan.clear();
            }
            self.obstacle = obstacle;
        }
        if let Some(plan) = update.plan {
            self.plan = plan.trim().to_string();
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.outcome.is_empty() && !self.obstacle.is_empty() && !self.plan.is_empty()
    }

    /// "If <obstacle>, then I will <plan>" once both halves exist.
    pub fn implementation_intention(&self) -> Option<String> {
        if self.obstacle.is_empty() || self.plan.is_empty() {
            return None;
        }
        Some(format!("If {}, then I will {}", self.obstacle, self.plan))
    }
}
