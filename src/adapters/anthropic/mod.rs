//! Anthropic Messages API collaborator.

pub mod client;
pub mod retry;
pub mod types;

pub use client::{AnthropicClient, AnthropicConfig, ANTHROPIC_VERSION};
pub use retry::RetryPolicy;
