//! Domain layer for the ValuesLens assessment engine
//!
//! This module contains the assessment state machine, its models and the
//! port traits collaborators implement.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult, NameConstraint};
