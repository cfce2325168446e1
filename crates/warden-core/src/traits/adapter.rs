// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base adapter trait that all upstream adapters implement.

use async_trait::async_trait;

use crate::error::WardenError;
use crate::types::{AdapterType, HealthStatus};

/// The base trait for all Warden adapters.
///
/// Provides identity and a health probe so the binary can report which
/// collaborators are reachable before serving requests.
#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Returns the semantic version of this adapter.
    fn version(&self) -> semver::Version;

    /// Returns the kind of collaborator this adapter talks to.
    fn adapter_type(&self) -> AdapterType;

    /// Performs a health check and returns the adapter's current status.
    async fn health_check(&self) -> Result<HealthStatus, WardenError>;
}
