// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault content read from a local file.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;
use warden_core::types::{AdapterType, HealthStatus, VaultContent};
use warden_core::{PluginAdapter, VaultAdapter, WardenError};

/// Reads the vault from disk on every load, so edits apply without restart.
pub struct FileVault {
    path: PathBuf,
}

impl FileVault {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PluginAdapter for FileVault {
    fn name(&self) -> &str {
        "file-vault"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Vault
    }

    async fn health_check(&self) -> Result<HealthStatus, WardenError> {
        Ok(match tokio::fs::metadata(&self.path).await {
            Ok(meta) if meta.is_file() => HealthStatus::Healthy,
            Ok(_) => HealthStatus::Unhealthy(format!("{} is not a file", self.path.display())),
            Err(e) => HealthStatus::Unhealthy(format!("{}: {e}", self.path.display())),
        })
    }
}

#[async_trait]
impl VaultAdapter for FileVault {
    async fn load(&self) -> Result<VaultContent, WardenError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| WardenError::Internal(format!("failed to read vault {}: {e}", self.path.display())))?;
        debug!(path = %self.path.display(), chars = text.len(), "vault loaded");
        let loaded = !text.trim().is_empty();
        Ok(VaultContent { text, loaded })
    }
}
