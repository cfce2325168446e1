// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault adapter trait for authoritative business-rules content.

use async_trait::async_trait;

use crate::error::WardenError;
use crate::traits::adapter::PluginAdapter;
use crate::types::VaultContent;

/// Adapter for the document/vault content provider.
///
/// Storage and retrieval live outside this workspace; the engine only reads
/// the current text and its loaded flag.
#[async_trait]
pub trait VaultAdapter: PluginAdapter {
    /// Returns the current vault text and whether it is loaded.
    async fn load(&self) -> Result<VaultContent, WardenError>;
}
