// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock chat-completion backend for deterministic testing.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use warden_core::types::{AdapterType, HealthStatus, ProviderRequest, ProviderResponse, TokenUsage};
use warden_core::{PluginAdapter, ProviderAdapter, WardenError};

/// A mock backend that returns pre-configured responses.
///
/// Queued responses are popped first; once the queue is empty the default
/// text is returned. Every request is captured for assertions.
pub struct MockProvider {
    responses: Mutex<VecDeque<String>>,
    default_response: String,
    usage: TokenUsage,
    failing: AtomicBool,
    panicking: bool,
    calls: AtomicUsize,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            default_response: "mock response".to_string(),
            usage: TokenUsage {
                input_tokens: 400,
                output_tokens: 300,
            },
            failing: AtomicBool::new(false),
            panicking: false,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails with a provider error.
    pub fn failing() -> Self {
        let provider = Self::new();
        provider.failing.store(true, Ordering::SeqCst);
        provider
    }

    /// Every call panics. Used to exercise the emergency path.
    pub fn panicking() -> Self {
        Self {
            panicking: true,
            ..Self::new()
        }
    }

    /// Replace the default response text.
    pub fn with_response(mut self, text: impl Into<String>) -> Self {
        self.default_response = text.into();
        self
    }

    /// Queue responses returned in order before the default.
    pub fn with_responses(self, responses: Vec<String>) -> Self {
        if let Ok(mut queue) = self.responses.lock() {
            queue.extend(responses);
        }
        self
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = usage;
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn usage(&self) -> TokenUsage {
        self.usage
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn next_response(&self) -> String {
        self.responses
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front())
            .unwrap_or_else(|| self.default_response.clone())
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, WardenError> {
        if self.failing.load(Ordering::SeqCst) {
            Ok(HealthStatus::Unhealthy("configured to fail".into()))
        } else {
            Ok(HealthStatus::Healthy)
        }
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, WardenError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        if self.panicking {
            panic!("mock provider panicked");
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(WardenError::provider("mock provider failure"));
        }

        Ok(ProviderResponse {
            id: format!("mock-resp-{}", uuid::Uuid::new_v4()),
            content: self.next_response(),
            model: request.model,
            usage: self.usage,
        })
    }
}
