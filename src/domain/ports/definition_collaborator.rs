//! AI definition collaborator port.

use async_trait::async_trait;
use thiserror::Error;

/// Errors a collaborator call can end in.
///
/// None of these reach the end user; the generation gateway turns every one
/// of them into a fallback result.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("Collaborator is not configured: {0}")]
    NotConfigured(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timed out after {0}s")]
    Timeout(u64),
}

impl CollaboratorError {
    /// Whether a retry could plausibly succeed.
    ///
    /// Rate limits, server errors and transport failures are transient;
    /// client errors and bad payloads are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Http { status, .. } => *status == 429 || *status >= 500,
            Self::NotConfigured(_) | Self::InvalidResponse(_) | Self::Timeout(_) => false,
        }
    }
}

/// A fully built prompt for one generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionPrompt {
    pub system: String,
    pub user: String,
}

/// A hosted model that turns a prompt into raw text.
#[async_trait]
pub trait DefinitionCollaborator: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// False when a required credential is missing.
    fn is_configured(&self) -> bool;

    /// Run the prompt and return the model's raw text output.
    async fn complete(&self, prompt: &DefinitionPrompt) -> Result<String, CollaboratorError>;
}
