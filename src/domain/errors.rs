//! Domain errors for the ValuesLens assessment engine.

use std::fmt;

use thiserror::Error;

/// Constraint a custom value name can violate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameConstraint {
    /// Fewer than the minimum number of characters.
    TooShort { min: usize },
    /// More than the maximum number of characters.
    TooLong { max: usize },
    /// Contains something other than letters and spaces.
    LettersAndSpacesOnly,
}

impl fmt::Display for NameConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort { min } => write!(f, "must be at least {min} characters"),
            Self::TooLong { max } => write!(f, "must be at most {max} characters"),
            Self::LettersAndSpacesOnly => write!(f, "may only contain letters and spaces"),
        }
    }
}

/// Domain-level errors that can occur while driving an assessment.
///
/// Every variant is returned before any state is touched, so a caller that
/// receives an error can assume the session is unchanged.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Value catalog must contain exactly {expected} values, found {actual}")]
    CatalogSize { expected: usize, actual: usize },

    #[error("Value catalog contains duplicate id: {0}")]
    DuplicateCatalogId(String),

    #[error("Unknown value: {0}")]
    UnknownValue(String),

    #[error("Value {actual} is out of order, the current card is {expected}")]
    OutOfOrder { expected: String, actual: String },

    #[error("Sorting is already complete")]
    SortingComplete,

    #[error("Sorting is incomplete: {cursor} of {total} values assigned")]
    SortingIncomplete { cursor: usize, total: usize },

    #[error("Invalid custom value name '{name}': {constraint}")]
    InvalidCustomValueName { name: String, constraint: NameConstraint },

    #[error("A custom value already exists for this session: {0}")]
    CustomValueExists(String),

    #[error("Value {0} is not marked very important")]
    NotVeryImportant(String),

    #[error("Value {0} appears more than once")]
    DuplicateValue(String),

    #[error("Expected exactly {expected} values, got {actual}")]
    WrongSelectionSize { expected: usize, actual: usize },

    #[error("Ranking must be a permutation of the current selection")]
    NotASelectionPermutation,

    #[error("No values have been selected yet")]
    NoSelection,

    #[error("No ranking has been set yet")]
    NoRanking,

    #[error("Value {0} is not one of the ranked top values")]
    NotATopValue(String),

    #[error("Position {index} is out of range for a list of {len}")]
    PositionOutOfRange { index: usize, len: usize },

    #[error("Session has not been started")]
    SessionNotStarted,

    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("Share artifact not found: {0}")]
    ShareNotFound(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_constraint_is_named_in_message() {
        let err = DomainError::InvalidCustomValueName {
            name: "X".to_string(),
            constraint: NameConstraint::TooShort { min: 2 },
        };
        assert_eq!(
            err.to_string(),
            "Invalid custom value name 'X': must be at least 2 characters"
        );
    }

    #[test]
    fn test_serde_error_conversion() {
        let err: DomainError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, DomainError::SerializationError(_)));
    }
}
