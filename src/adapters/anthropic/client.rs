//! HTTP client for the Anthropic Messages API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use tracing::{debug, instrument};

use super::retry::RetryPolicy;
use super::types::{Message, MessageRole, MessagesRequest, MessagesResponse};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::GenerationConfig;
use crate::domain::ports::{CollaboratorError, DefinitionCollaborator, DefinitionPrompt};

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// Missing key means the collaborator is unconfigured
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    /// Per-request HTTP timeout
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
}

impl AnthropicConfig {
    pub fn from_generation(config: &GenerationConfig) -> Self {
        Self {
            api_key: config.resolve_api_key(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            request_timeout: Duration::from_secs(config.timeout_secs),
            retry: RetryPolicy::new(config.max_retries, config.initial_backoff_ms),
        }
    }
}

pub struct AnthropicClient {
    config: AnthropicConfig,
    http: Client,
}

impl AnthropicClient {
    pub fn new(config: AnthropicConfig) -> DomainResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| {
                DomainError::ValidationFailed(format!("Failed to create HTTP client: {e}"))
            })?;
        Ok(Self { config, http })
    }

    fn build_request(&self, prompt: &DefinitionPrompt) -> MessagesRequest {
        MessagesRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            system: (!prompt.system.is_empty()).then(|| prompt.system.clone()),
            messages: vec![Message {
                role: MessageRole::User,
                content: prompt.user.clone(),
            }],
        }
    }

    async fn send_once(
        &self,
        api_key: &str,
        request: &MessagesRequest,
    ) -> Result<String, CollaboratorError> {
        let response = self
            .http
            .post(format!("{}/v1/messages", self.config.base_url))
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(request)
            .send()
            .await
            .map_err(|e| CollaboratorError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CollaboratorError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| CollaboratorError::InvalidResponse(e.to_string()))?;
        if let Some(usage) = &parsed.usage {
            debug!(
                id = %parsed.id,
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                stop_reason = ?parsed.stop_reason,
                "messages API call completed"
            );
        }

        let text = parsed.text();
        if text.trim().is_empty() {
            return Err(CollaboratorError::InvalidResponse(
                "response has no text content".to_string(),
            ));
        }
        Ok(text)
    }
}

#[async_trait]
impl DefinitionCollaborator for AnthropicClient {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    #[instrument(skip(self, prompt), fields(model = %self.config.model))]
    async fn complete(&self, prompt: &DefinitionPrompt) -> Result<String, CollaboratorError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| CollaboratorError::NotConfigured("ANTHROPIC_API_KEY not set".to_string()))?;

        let request = self.build_request(prompt);
        self.config
            .retry
            .execute(|| self.send_once(api_key, &request))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn config(base_url: String, max_retries: u32) -> AnthropicConfig {
        AnthropicConfig {
            api_key: Some("test-api-key".to_string()),
            base_url,
            model: "test-model".to_string(),
            max_tokens: 256,
            request_timeout: Duration::from_secs(5),
            retry: RetryPolicy::new(max_retries, 1),
        }
    }

    fn prompt() -> DefinitionPrompt {
        DefinitionPrompt {
            system: "be brief".to_string(),
            user: "define care".to_string(),
        }
    }

    fn body(text: &str) -> String {
        serde_json::json!({
            "id": "msg_01",
            "type": "message",
            "role": "assistant",
            "content": [{"type": "text", "text": text}],
            "model": "test-model",
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 5}
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_complete_sends_headers_and_returns_text() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .match_header("x-api-key", "test-api-key")
            .match_header("anthropic-version", ANTHROPIC_VERSION)
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": "test-model",
                "system": "be brief"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body("{\"definitions\": []}"))
            .create_async()
            .await;

        let client = AnthropicClient::new(config(server.url(), 0)).unwrap();
        let text = client.complete(&prompt()).await.unwrap();
        assert_eq!(text, "{\"definitions\": []}");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_retries_server_errors() {
        let mut server = Server::new_async().await;
        let failing = server
            .mock("POST", "/v1/messages")
            .with_status(529)
            .with_body("overloaded")
            .expect(3)
            .create_async()
            .await;

        let client = AnthropicClient::new(config(server.url(), 2)).unwrap();
        let err = client.complete(&prompt()).await.unwrap_err();
        assert!(matches!(err, CollaboratorError::Http { status: 529, .. }));
        failing.assert_async().await;
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .with_status(401)
            .with_body("bad key")
            .expect(1)
            .create_async()
            .await;

        let client = AnthropicClient::new(config(server.url(), 2)).unwrap();
        let err = client.complete(&prompt()).await.unwrap_err();
        assert!(matches!(err, CollaboratorError::Http { status: 401, .. }));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_key_is_unconfigured() {
        let mut cfg = config("http://127.0.0.1:9".to_string(), 0);
        cfg.api_key = None;
        let client = AnthropicClient::new(cfg).unwrap();
        assert!(!client.is_configured());
        assert!(matches!(
            client.complete(&prompt()).await,
            Err(CollaboratorError::NotConfigured(_))
        ));
    }
}
