// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory adapter trait for persistent long-term memory.

use async_trait::async_trait;

use crate::error::WardenError;
use crate::traits::adapter::PluginAdapter;
use crate::types::MemoryRecall;

/// Adapter for the persistent memory store.
#[async_trait]
pub trait MemoryAdapter: PluginAdapter {
    /// Returns prior text relevant to `query` for `user_id`.
    async fn recall(&self, user_id: &str, query: &str) -> Result<MemoryRecall, WardenError>;
}
