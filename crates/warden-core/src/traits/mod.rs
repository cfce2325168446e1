// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for upstream collaborators.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod embedding;
pub mod memory;
pub mod provider;
pub mod vault;

pub use adapter::PluginAdapter;
pub use embedding::EmbeddingAdapter;
pub use memory::MemoryAdapter;
pub use provider::ProviderAdapter;
pub use vault::VaultAdapter;
