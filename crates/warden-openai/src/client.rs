// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for OpenAI-compatible APIs.
//!
//! Provides [`OpenAiClient`] which handles authentication, JSON request
//! construction and error mapping. Rate limits surface as
//! [`WardenError::RateLimited`] so the shared call queue can back off;
//! server errors (500, 503) are retried once here.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, RETRY_AFTER};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use warden_core::WardenError;

use crate::types::{
    ApiErrorResponse, ChatCompletionRequest, ChatCompletionResponse, EmbeddingRequest,
    EmbeddingResponse,
};

/// Which service a call belongs to; decides the error variant.
#[derive(Debug, Clone, Copy)]
enum Service {
    Chat,
    Embeddings,
}

impl Service {
    fn error(
        self,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> WardenError {
        match self {
            Service::Chat => WardenError::Provider { message, source },
            Service::Embeddings => WardenError::Embedding { message, source },
        }
    }

    fn endpoint(self) -> &'static str {
        match self {
            Service::Chat => "chat/completions",
            Service::Embeddings => "embeddings",
        }
    }
}

/// HTTP client for an OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    max_retries: u32,
    retry_delay: Duration,
}

impl OpenAiClient {
    /// Creates a client for `base_url` (e.g. `https://api.openai.com/v1`).
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self, WardenError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|e| WardenError::Config(format!("invalid API key header value: {e}")))?,
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| WardenError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            max_retries: 1,
            retry_delay: Duration::from_secs(1),
        })
    }

    #[cfg(test)]
    pub(crate) fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, WardenError> {
        self.post(Service::Chat, request).await
    }

    pub async fn embeddings(&self, request: &EmbeddingRequest) -> Result<EmbeddingResponse, WardenError> {
        self.post(Service::Embeddings, request).await
    }

    async fn post<Req, Resp>(&self, service: Service, body: &Req) -> Result<Resp, WardenError>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, service.endpoint());
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, endpoint = service.endpoint(), "retrying request after server error");
                tokio::time::sleep(self.retry_delay).await;
            }

            let response = self.client.post(&url).json(body).send().await.map_err(|e| {
                if e.is_timeout() {
                    WardenError::Timeout {
                        duration: self.timeout,
                    }
                } else {
                    service.error(format!("HTTP request failed: {e}"), Some(Box::new(e)))
                }
            })?;

            let status = response.status();
            debug!(status = %status, attempt, endpoint = service.endpoint(), "response received");

            if status.is_success() {
                let text = response.text().await.map_err(|e| {
                    service.error(format!("failed to read response body: {e}"), Some(Box::new(e)))
                })?;
                return serde_json::from_str(&text).map_err(|e| {
                    service.error(format!("failed to parse API response: {e}"), Some(Box::new(e)))
                });
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = retry_after(response.headers());
                warn!(retry_after_secs = retry_after.map(|d| d.as_secs()), "rate limited by API");
                return Err(WardenError::RateLimited { retry_after });
            }

            let body = response.text().await.unwrap_or_default();
            if is_transient_error(status) && attempt < self.max_retries {
                warn!(status = %status, body = %body, "server error, will retry");
                last_error = Some(service.error(format!("API returned {status}: {body}"), None));
                continue;
            }

            return Err(service.error(api_error_message(status, &body), None));
        }

        Err(last_error
            .unwrap_or_else(|| service.error("request failed after retries".into(), None)))
    }
}

fn api_error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(api_err) => format!(
            "API error {status} ({}): {}",
            api_err.error.type_.as_deref().unwrap_or("unknown"),
            api_err.error.message
        ),
        Err(_) => format!("API returned {status}: {body}"),
    }
}

/// `retry-after` in whole seconds; HTTP-date values are ignored.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

fn is_transient_error(status: StatusCode) -> bool {
    matches!(status.as_u16(), 500 | 503)
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::types::ApiMessage;

    fn test_client(base_url: &str) -> OpenAiClient {
        OpenAiClient::new("test-api-key", base_url, Duration::from_secs(5))
            .unwrap()
            .with_retry_delay(Duration::from_millis(10))
    }

    fn test_request() -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: "gpt-4o-mini".into(),
            messages: vec![ApiMessage {
                role: "user".into(),
                content: "Hello".into(),
            }],
            max_tokens: 256,
            temperature: 0.2,
        }
    }

    fn completion_body(id: &str, text: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "object": "chat.completion",
            "model": "gpt-4o-mini",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": text},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 12, "completion_tokens": 4, "total_tokens": 16}
        })
    }

    #[tokio::test]
    async fn chat_completion_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-api-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("c1", "Hi!")))
            .mount(&server)
            .await;

        let result = test_client(&server.uri())
            .chat_completion(&test_request())
            .await
            .unwrap();
        assert_eq!(result.id, "c1");
        assert_eq!(result.usage.unwrap().prompt_tokens, 12);
        assert_eq!(result.choices[0].message.content.as_deref(), Some("Hi!"));
    }

    #[tokio::test]
    async fn rate_limit_maps_to_rate_limited_with_hint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "3"))
            .expect(1)
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .chat_completion(&test_request())
            .await
            .unwrap_err();
        match err {
            WardenError::RateLimited { retry_after } => {
                assert_eq!(retry_after, Some(Duration::from_secs(3)));
            }
            other => panic!("expected RateLimited, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn server_error_is_retried_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("c2", "after retry")))
            .mount(&server)
            .await;

        let result = test_client(&server.uri())
            .chat_completion(&test_request())
            .await
            .unwrap();
        assert_eq!(result.id, "c2");
    }

    #[tokio::test]
    async fn exhausted_retries_on_503_report_error() {
        let server = MockServer::start().await;
        let body = serde_json::json!({"error": {"message": "overloaded", "type": "server_error"}});
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(503).set_body_json(&body))
            .expect(2)
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .chat_completion(&test_request())
            .await
            .unwrap_err();
        assert!(matches!(err, WardenError::Provider { .. }));
        assert!(err.to_string().contains("server_error"), "got: {err}");
    }

    #[tokio::test]
    async fn client_error_is_not_retried() {
        let server = MockServer::start().await;
        let body = serde_json::json!({"error": {"message": "Bad model", "type": "invalid_request_error"}});
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(400).set_body_json(&body))
            .expect(1)
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .chat_completion(&test_request())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Bad model"), "got: {err}");
    }

    #[tokio::test]
    async fn embedding_errors_use_embedding_variant() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .mount(&server)
            .await;

        let request = EmbeddingRequest {
            model: "text-embedding-3-small".into(),
            input: vec!["hello".into()],
        };
        let err = test_client(&server.uri()).embeddings(&request).await.unwrap_err();
        assert!(matches!(err, WardenError::Embedding { .. }));
        assert!(err.to_string().contains("unauthorized"));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = OpenAiClient::new("k", "http://localhost:1/v1/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:1/v1");
    }

    #[test]
    fn retry_after_ignores_dates() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("Wed, 21 Oct 2026 07:28:00 GMT"));
        assert_eq!(retry_after(&headers), None);
        headers.insert(RETRY_AFTER, HeaderValue::from_static("7"));
        assert_eq!(retry_after(&headers), Some(Duration::from_secs(7)));
    }
}
