// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Warden integration tests.
//!
//! Provides mock adapters and a test harness for fast, deterministic,
//! CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockProvider`] - chat backend with queued responses and failure switches
//! - [`MockEmbedder`] - keyword-bag embedder that separates the exemplar categories
//! - [`MockVault`] / [`MockMemory`] - fixed vault and memory collaborators
//! - [`TestHarness`] - a fully wired orchestrator over the mocks

pub mod harness;
pub mod mock_adapters;
pub mod mock_embedder;
pub mod mock_provider;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_adapters::{MockMemory, MockVault};
pub use mock_embedder::MockEmbedder;
pub use mock_provider::MockProvider;
