// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-compatible adapter for Warden.
//!
//! [`OpenAiAdapter`] implements both [`ProviderAdapter`] (chat completions)
//! and [`EmbeddingAdapter`] (embeddings) against one HTTP endpoint.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};
use warden_config::WardenConfig;
use warden_core::types::{
    AdapterType, EmbeddingInput, EmbeddingOutput, HealthStatus, ProviderRequest, ProviderResponse,
    TokenUsage,
};
use warden_core::{EmbeddingAdapter, PluginAdapter, ProviderAdapter, WardenError};

use crate::client::OpenAiClient;
use crate::types::{ApiMessage, ChatCompletionRequest, EmbeddingRequest};

/// Chat and embedding adapter for an OpenAI-compatible API.
///
/// API key resolution order: config -> `OPENAI_API_KEY` env var -> error.
pub struct OpenAiAdapter {
    client: OpenAiClient,
    embedding_model: String,
}

impl OpenAiAdapter {
    pub fn new(config: &WardenConfig) -> Result<Self, WardenError> {
        let api_key = resolve_api_key(&config.openai.api_key)?;
        let client = OpenAiClient::new(
            &api_key,
            &config.openai.base_url,
            Duration::from_secs(config.openai.request_timeout_secs),
        )?;

        info!(
            base_url = client.base_url(),
            embedding_model = config.openai.embedding_model.as_str(),
            "OpenAI adapter initialized"
        );

        Ok(Self::with_client(client, config.openai.embedding_model.clone()))
    }

    pub fn with_client(client: OpenAiClient, embedding_model: String) -> Self {
        Self {
            client,
            embedding_model,
        }
    }
}

/// The system prompt becomes the leading `system` message.
fn to_chat_request(request: ProviderRequest) -> ChatCompletionRequest {
    let system = request.system_prompt.map(|content| ApiMessage {
        role: "system".to_string(),
        content,
    });
    let messages = system
        .into_iter()
        .chain(request.messages.into_iter().map(|m| ApiMessage {
            role: m.role,
            content: m.content,
        }))
        .collect();

    ChatCompletionRequest {
        model: request.model,
        messages,
        max_tokens: request.max_tokens,
        temperature: request.temperature,
    }
}

#[async_trait]
impl PluginAdapter for OpenAiAdapter {
    fn name(&self) -> &str {
        "openai"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, WardenError> {
        // No probe call: health checks must not spend tokens.
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiAdapter {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, WardenError> {
        let api_request = to_chat_request(request);
        let response = self.client.chat_completion(&api_request).await?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| WardenError::provider("response contained no choices"))?;
        let usage = response.usage.unwrap_or_default();
        debug!(
            model = response.model.as_str(),
            finish_reason = choice.finish_reason.as_deref().unwrap_or("unknown"),
            "completion received"
        );

        Ok(ProviderResponse {
            id: response.id,
            content: choice.message.content.unwrap_or_default(),
            model: response.model,
            usage: TokenUsage {
                input_tokens: usage.prompt_tokens,
                output_tokens: usage.completion_tokens,
            },
        })
    }
}

#[async_trait]
impl EmbeddingAdapter for OpenAiAdapter {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, WardenError> {
        let expected = input.texts.len();
        let request = EmbeddingRequest {
            model: self.embedding_model.clone(),
            input: input.texts,
        };
        let mut response = self.client.embeddings(&request).await?;

        if response.data.len() != expected {
            return Err(WardenError::embedding(format!(
                "expected {expected} embeddings, got {}",
                response.data.len()
            )));
        }
        response.data.sort_by_key(|d| d.index);
        let dimensions = response.data.first().map(|d| d.embedding.len()).unwrap_or(0);

        Ok(EmbeddingOutput {
            embeddings: response.data.into_iter().map(|d| d.embedding).collect(),
            dimensions,
            total_tokens: response.usage.map(|u| u.total_tokens),
        })
    }
}

fn resolve_api_key(config_key: &Option<String>) -> Result<String, WardenError> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Ok(key.clone());
    }

    std::env::var("OPENAI_API_KEY").map_err(|_| {
        WardenError::Config(
            "OpenAI API key not found. Set openai.api_key in config or the OPENAI_API_KEY environment variable.".into(),
        )
    })
}

#[cfg(test)]
mod tests {
    use warden_core::types::ChatMessage;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn adapter(base_url: &str) -> OpenAiAdapter {
        let client = OpenAiClient::new("test-key", base_url, Duration::from_secs(5)).unwrap();
        OpenAiAdapter::with_client(client, "text-embedding-3-small".into())
    }

    fn provider_request() -> ProviderRequest {
        ProviderRequest {
            model: "gpt-4o".into(),
            system_prompt: Some("Answer truthfully.".into()),
            messages: vec![ChatMessage::user("Hi"), ChatMessage::assistant("Hello"), ChatMessage::user("ROI?")],
            max_tokens: 300,
            temperature: 0.2,
        }
    }

    #[test]
    fn resolve_api_key_prefers_config() {
        assert_eq!(resolve_api_key(&Some("sk-config".into())).unwrap(), "sk-config");
    }

    #[test]
    fn system_prompt_leads_the_messages() {
        let request = to_chat_request(provider_request());
        assert_eq!(request.model, "gpt-4o");
        assert_eq!(request.messages.len(), 4);
        assert_eq!(request.messages[0].role, "system");
        assert_eq!(request.messages[0].content, "Answer truthfully.");
        assert_eq!(request.messages[3].content, "ROI?");
    }

    #[test]
    fn no_system_message_without_prompt() {
        let mut provider = provider_request();
        provider.system_prompt = None;
        let request = to_chat_request(provider);
        assert_eq!(request.messages.len(), 3);
        assert_eq!(request.messages[0].role, "user");
    }

    #[tokio::test]
    async fn complete_maps_content_and_usage() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4o",
                "max_tokens": 300,
                "messages": [{"role": "system", "content": "Answer truthfully."}, {"role": "user", "content": "Hi"}, {"role": "assistant", "content": "Hello"}, {"role": "user", "content": "ROI?"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-9",
                "model": "gpt-4o-2024-08-06",
                "choices": [{"index": 0, "message": {"role": "assistant", "content": "It depends."}, "finish_reason": "stop"}],
                "usage": {"prompt_tokens": 40, "completion_tokens": 3, "total_tokens": 43}
            })))
            .mount(&server)
            .await;

        let response = adapter(&server.uri()).complete(provider_request()).await.unwrap();
        assert_eq!(response.id, "chatcmpl-9");
        assert_eq!(response.content, "It depends.");
        assert_eq!(response.model, "gpt-4o-2024-08-06");
        assert_eq!(response.usage, TokenUsage { input_tokens: 40, output_tokens: 3 });
    }

    #[tokio::test]
    async fn complete_without_choices_is_a_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-0", "model": "gpt-4o", "choices": []
            })))
            .mount(&server)
            .await;

        let err = adapter(&server.uri()).complete(provider_request()).await.unwrap_err();
        assert!(matches!(err, WardenError::Provider { .. }));
    }

    #[tokio::test]
    async fn embed_orders_vectors_by_index() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .and(body_partial_json(serde_json::json!({"model": "text-embedding-3-small"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "object": "list",
                "data": [
                    {"object": "embedding", "index": 1, "embedding": [0.0, 1.0, 0.0]},
                    {"object": "embedding", "index": 0, "embedding": [1.0, 0.0, 0.0]}
                ],
                "model": "text-embedding-3-small",
                "usage": {"prompt_tokens": 6, "total_tokens": 6}
            })))
            .mount(&server)
            .await;

        let output = adapter(&server.uri())
            .embed(EmbeddingInput {
                texts: vec!["first".into(), "second".into()],
            })
            .await
            .unwrap();
        assert_eq!(output.dimensions, 3);
        assert_eq!(output.embeddings[0], vec![1.0, 0.0, 0.0]);
        assert_eq!(output.embeddings[1], vec![0.0, 1.0, 0.0]);
        assert_eq!(output.total_tokens, Some(6));
    }

    #[tokio::test]
    async fn embed_rejects_short_responses() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"index": 0, "embedding": [1.0]}]
            })))
            .mount(&server)
            .await;

        let err = adapter(&server.uri())
            .embed(EmbeddingInput {
                texts: vec!["a".into(), "b".into()],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, WardenError::Embedding { .. }));
    }

    #[test]
    fn plugin_adapter_metadata() {
        let adapter = adapter("http://localhost:1");
        assert_eq!(adapter.name(), "openai");
        assert_eq!(adapter.version(), semver::Version::new(0, 1, 0));
        assert_eq!(adapter.adapter_type(), AdapterType::Provider);
    }
}
