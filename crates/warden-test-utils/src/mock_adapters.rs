// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock vault and memory collaborators.

use std::sync::Mutex;

use async_trait::async_trait;
use warden_core::types::{AdapterType, HealthStatus, MemoryRecall, VaultContent};
use warden_core::{MemoryAdapter, PluginAdapter, VaultAdapter, WardenError};

/// A vault with fixed content.
pub struct MockVault {
    content: VaultContent,
    failing: bool,
}

impl MockVault {
    pub fn loaded(text: impl Into<String>) -> Self {
        Self {
            content: VaultContent {
                text: text.into(),
                loaded: true,
            },
            failing: false,
        }
    }

    /// A vault that has not finished loading.
    pub fn unloaded() -> Self {
        Self {
            content: VaultContent::default(),
            failing: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            content: VaultContent::default(),
            failing: true,
        }
    }
}

#[async_trait]
impl PluginAdapter for MockVault {
    fn name(&self) -> &str {
        "mock-vault"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Vault
    }

    async fn health_check(&self) -> Result<HealthStatus, WardenError> {
        Ok(if self.content.loaded {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded("vault not loaded".into())
        })
    }
}

#[async_trait]
impl VaultAdapter for MockVault {
    async fn load(&self) -> Result<VaultContent, WardenError> {
        if self.failing {
            return Err(WardenError::Internal("mock vault unavailable".into()));
        }
        Ok(self.content.clone())
    }
}

/// A memory store returning the same recall for every query.
pub struct MockMemory {
    recall: MemoryRecall,
    failing: bool,
    queries: Mutex<Vec<(String, String)>>,
}

impl MockMemory {
    pub fn with_memories(text: impl Into<String>, count: usize) -> Self {
        Self {
            recall: MemoryRecall {
                text: text.into(),
                count,
            },
            failing: false,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::with_memories("", 0)
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::empty()
        }
    }

    /// `(user_id, query)` pairs received so far.
    pub fn queries(&self) -> Vec<(String, String)> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PluginAdapter for MockMemory {
    fn name(&self) -> &str {
        "mock-memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Memory
    }

    async fn health_check(&self) -> Result<HealthStatus, WardenError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl MemoryAdapter for MockMemory {
    async fn recall(&self, user_id: &str, query: &str) -> Result<MemoryRecall, WardenError> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push((user_id.to_string(), query.to_string()));
        }
        if self.failing {
            return Err(WardenError::Internal("mock memory unavailable".into()));
        }
        Ok(self.recall.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn vault_states() {
        assert!(MockVault::loaded("rules").load().await.unwrap().loaded);
        assert!(!MockVault::unloaded().load().await.unwrap().loaded);
        assert!(MockVault::failing().load().await.is_err());
    }

    #[tokio::test]
    async fn memory_records_queries() {
        let memory = MockMemory::with_memories("prefers annual billing", 1);
        let recall = memory.recall("u1", "billing?").await.unwrap();
        assert_eq!(recall.count, 1);
        assert_eq!(memory.queries(), vec![("u1".to_string(), "billing?".to_string())]);
    }
}
