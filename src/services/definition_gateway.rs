//! Fallback-aware definition generation.
//!
//! `generate` never fails. It returns exactly one definition per requested
//! value, taken from the AI collaborator when it answers in time with a usable
//! payload and from the deterministic local generator otherwise.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};

use super::fallback::fallback_definition;
use super::prompt::{build_prompt, parse_definitions, GenerationRequest};
use crate::domain::models::{Definition, GeneratedDefinition, GenerationConfig, ValueRef};
use crate::domain::ports::{CollaboratorError, DefinitionCollaborator};

pub struct DefinitionGateway {
    collaborator: Option<Arc<dyn DefinitionCollaborator>>,
    timeout: Duration,
}

impl DefinitionGateway {
    pub fn new(collaborator: Option<Arc<dyn DefinitionCollaborator>>, timeout: Duration) -> Self {
        Self {
            collaborator,
            timeout,
        }
    }

    /// A gateway that only ever uses the local generator.
    pub fn fallback_only() -> Self {
        Self::new(None, Duration::from_secs(1))
    }

    pub fn from_config(
        collaborator: Option<Arc<dyn DefinitionCollaborator>>,
        config: &GenerationConfig,
    ) -> Self {
        let collaborator = collaborator.filter(|_| config.enabled);
        Self::new(collaborator, Duration::from_secs(config.timeout_secs))
    }

    fn all_fallback(values: &[ValueRef]) -> BTreeMap<String, GeneratedDefinition> {
        values
            .iter()
            .map(|value| (value.id.clone(), fallback(value)))
            .collect()
    }

    #[instrument(skip(self, request), fields(values = request.values.len()))]
    pub async fn generate(&self, request: &GenerationRequest) -> BTreeMap<String, GeneratedDefinition> {
        if request.values.is_empty() {
            return BTreeMap::new();
        }

        let Some(collaborator) = self.collaborator.as_ref().filter(|c| c.is_configured()) else {
            info!("definition collaborator not configured; using local fallback");
            return Self::all_fallback(&request.values);
        };

        let prompt = build_prompt(request);
        let response = match tokio::time::timeout(self.timeout, collaborator.complete(&prompt)).await
        {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                warn!(collaborator = collaborator.name(), error = %e, "definition generation failed; using local fallback");
                return Self::all_fallback(&request.values);
            }
            Err(_) => {
                let e = CollaboratorError::Timeout(self.timeout.as_secs());
                warn!(collaborator = collaborator.name(), error = %e, "definition generation timed out; using local fallback");
                return Self::all_fallback(&request.values);
            }
        };

        let mut parsed = match parse_definitions(&response, &request.value_ids()) {
            Ok(parsed) => parsed,
            Err(reason) => {
                warn!(collaborator = collaborator.name(), %reason, "unusable definition payload; using local fallback");
                return Self::all_fallback(&request.values);
            }
        };

        request
            .values
            .iter()
            .map(|value| {
                let result = match parsed.remove(&value.id) {
                    Some(definition) => generated(definition, false),
                    None => {
                        warn!(value_id = %value.id, "no definition returned for value; using local fallback");
                        fallback(value)
                    }
                };
                (value.id.clone(), result)
            })
            .collect()
    }
}

fn generated(mut definition: Definition, fallback: bool) -> GeneratedDefinition {
    definition.user_edited = false;
    GeneratedDefinition {
        definition,
        fallback,
    }
}

fn fallback(value: &ValueRef) -> GeneratedDefinition {
    generated(fallback_definition(value), true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::DefinitionPrompt;
    use async_trait::async_trait;

    struct Scripted {
        configured: bool,
        reply: Result<String, u16>,
        delay: Duration,
    }

    #[async_trait]
    impl DefinitionCollaborator for Scripted {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn complete(&self, _prompt: &DefinitionPrompt) -> Result<String, CollaboratorError> {
            tokio::time::sleep(self.delay).await;
            self.reply.clone().map_err(|status| CollaboratorError::Http {
                status,
                body: String::new(),
            })
        }
    }

    fn gateway(configured: bool, reply: Result<&str, u16>, delay_ms: u64) -> DefinitionGateway {
        DefinitionGateway::new(
            Some(Arc::new(Scripted {
                configured,
                reply: reply.map(str::to_string),
                delay: Duration::from_millis(delay_ms),
            })),
            Duration::from_millis(200),
        )
    }

    fn request() -> GenerationRequest {
        GenerationRequest {
            values: ["integrity", "care"]
                .iter()
                .map(|id| ValueRef {
                    id: (*id).to_string(),
                    name: id.to_uppercase(),
                    short_description: None,
                })
                .collect(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_unconfigured_collaborator_falls_back() {
        let out = gateway(false, Ok("{}"), 0).generate(&request()).await;
        assert_eq!(out.len(), 2);
        assert!(out.values().all(|d| d.fallback && !d.definition.tagline.is_empty()));
    }

    #[tokio::test]
    async fn test_partial_payload_mixes_sources() {
        let reply = r#"{"definitions": [{"value_id": "care", "tagline": "Tending", "user_edited": true}]}"#;
        let out = gateway(true, Ok(reply), 0).generate(&request()).await;
        assert!(!out["care"].fallback);
        assert!(!out["care"].definition.user_edited);
        assert!(out["integrity"].fallback);
    }

    #[tokio::test]
    async fn test_http_error_falls_back() {
        let out = gateway(true, Err(500), 0).generate(&request()).await;
        assert!(out.values().all(|d| d.fallback));
    }

    #[tokio::test]
    async fn test_timeout_falls_back() {
        let out = gateway(true, Ok("{}"), 2_000).generate(&request()).await;
        assert_eq!(out.len(), 2);
        assert!(out.values().all(|d| d.fallback));
    }

    #[tokio::test]
    async fn test_disabled_in_config_never_calls_collaborator() {
        let config = GenerationConfig {
            enabled: false,
            ..Default::default()
        };
        let collaborator: Arc<dyn DefinitionCollaborator> = Arc::new(Scripted {
            configured: true,
            reply: Err(500),
            delay: Duration::ZERO,
        });
        let gw = DefinitionGateway::from_config(Some(collaborator), &config);
        let out = gw.generate(&request()).await;
        assert!(out.values().all(|d| d.fallback));
    }
}
