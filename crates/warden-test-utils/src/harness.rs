// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` wires a complete [`Orchestrator`] over mock adapters with an
//! unthrottled call queue. Provides `send()` to drive the full pipeline.

use std::sync::Arc;

use warden_agent::{Orchestrator, ProcessRequest, ProcessResponse};
use warden_config::WardenConfig;
use warden_core::{CallQueue, Mode, WardenError};
use warden_cost::CostLedger;

use crate::mock_adapters::{MockMemory, MockVault};
use crate::mock_embedder::MockEmbedder;
use crate::mock_provider::MockProvider;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    config: WardenConfig,
    responses: Vec<String>,
    provider: Option<MockProvider>,
    premium: Option<MockProvider>,
    embedder: Option<MockEmbedder>,
    vault: Option<MockVault>,
    memory: Option<MockMemory>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            config: WardenConfig::default(),
            responses: Vec::new(),
            provider: None,
            premium: None,
            embedder: None,
            vault: None,
            memory: None,
        }
    }

    pub fn with_config(mut self, config: WardenConfig) -> Self {
        self.config = config;
        self
    }

    /// Set responses for the default backend, returned in order.
    pub fn with_mock_responses(mut self, responses: Vec<String>) -> Self {
        self.responses = responses;
        self
    }

    /// Replace the default backend. Overrides `with_mock_responses`.
    pub fn with_provider(mut self, provider: MockProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Use a separate mock for the premium tier.
    pub fn with_premium(mut self, provider: MockProvider) -> Self {
        self.premium = Some(provider);
        self
    }

    pub fn with_embedder(mut self, embedder: MockEmbedder) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn with_vault(mut self, vault: MockVault) -> Self {
        self.vault = Some(vault);
        self
    }

    pub fn with_memory(mut self, memory: MockMemory) -> Self {
        self.memory = Some(memory);
        self
    }

    /// Build the test harness, initializing the orchestrator.
    pub async fn build(self) -> Result<TestHarness, WardenError> {
        let provider = Arc::new(match self.provider {
            Some(provider) => provider,
            None if self.responses.is_empty() => MockProvider::new(),
            None => MockProvider::new().with_responses(self.responses),
        });
        let premium = self.premium.map(Arc::new);
        let embedder = Arc::new(self.embedder.unwrap_or_default());
        let ledger = Arc::new(CostLedger::new());

        let mut builder = Orchestrator::builder(self.config.clone())
            .provider(provider.clone())
            .embedder(embedder.clone())
            .ledger(ledger.clone())
            .queue(Arc::new(CallQueue::unthrottled()));
        if let Some(premium) = &premium {
            builder = builder.premium_provider(premium.clone());
        }
        if let Some(vault) = self.vault {
            builder = builder.vault(Arc::new(vault));
        }
        if let Some(memory) = self.memory {
            builder = builder.memory(Arc::new(memory));
        }

        Ok(TestHarness {
            orchestrator: builder.build().await?,
            provider,
            premium,
            embedder,
            ledger,
            config: self.config,
        })
    }
}

/// A complete test environment over mock adapters.
pub struct TestHarness {
    pub orchestrator: Orchestrator,
    /// Default backend, also serving premium unless `premium` is set.
    pub provider: Arc<MockProvider>,
    pub premium: Option<Arc<MockProvider>>,
    pub embedder: Arc<MockEmbedder>,
    /// Ledger shared with the orchestrator.
    pub ledger: Arc<CostLedger>,
    pub config: WardenConfig,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// A request in a fresh session.
    pub fn request(&self, message: &str, mode: Mode) -> ProcessRequest {
        ProcessRequest::new(message, uuid::Uuid::new_v4().to_string(), mode)
    }

    /// Send one message in a fresh session.
    pub async fn send(&self, message: &str, mode: Mode) -> ProcessResponse {
        self.process(self.request(message, mode)).await
    }

    pub async fn process(&self, request: ProcessRequest) -> ProcessResponse {
        self.orchestrator.process(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn harness_drives_the_pipeline() {
        let harness = TestHarness::builder()
            .with_mock_responses(vec!["first".into(), "second".into()])
            .build()
            .await
            .unwrap();

        let first = harness.send("hello there", Mode::TruthGeneral).await;
        let second = harness.send("hello again", Mode::TruthGeneral).await;
        assert!(first.success && second.success);
        assert!(first.response_text.starts_with("first"));
        assert!(second.response_text.starts_with("second"));
        assert_eq!(harness.provider.call_count(), 2);
    }

    #[tokio::test]
    async fn sessions_are_isolated_in_the_ledger() {
        let harness = TestHarness::builder().build().await.unwrap();
        let request = harness.request("hello there", Mode::TruthGeneral);
        let session = warden_core::SessionId(request.session_id.clone());

        harness.process(request).await;
        let total = harness.ledger.session_total(&session).await;
        assert!(total > 0.0);

        let other = warden_core::SessionId("unused".into());
        assert_eq!(harness.ledger.session_total(&other).await, 0.0);
    }
}
