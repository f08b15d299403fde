//! CLI command implementations.

pub mod definitions;
pub mod narrative;
pub mod rank;
pub mod session;
pub mod share;
pub mod sort;
