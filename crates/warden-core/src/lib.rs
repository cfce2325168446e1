// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Warden orchestration engine.
//!
//! This crate provides the error taxonomy, the shared request/response types,
//! the [`Mode`] behaviour table, the adapter traits every upstream
//! collaborator implements, and the [`CallQueue`] that serializes external
//! calls.

pub mod dispatch;
pub mod error;
pub mod mode;
pub mod traits;
pub mod types;

pub use dispatch::CallQueue;
pub use error::WardenError;
pub use mode::{Mode, ModeBehavior};
pub use types::{AdapterType, HealthStatus, SessionId, TokenUsage};

pub use traits::{
    EmbeddingAdapter, MemoryAdapter, PluginAdapter, ProviderAdapter, VaultAdapter,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapter_type_round_trips_through_strum() {
        use std::str::FromStr;

        for variant in [
            AdapterType::Provider,
            AdapterType::Embedding,
            AdapterType::Vault,
            AdapterType::Memory,
        ] {
            let parsed = AdapterType::from_str(&variant.to_string()).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn memory_recall_emptiness() {
        let empty = types::MemoryRecall::default();
        assert!(empty.is_empty());
        let whitespace = types::MemoryRecall {
            text: "   ".into(),
            count: 2,
        };
        assert!(whitespace.is_empty());
        let real = types::MemoryRecall {
            text: "user prefers weekly reports".into(),
            count: 1,
        };
        assert!(!real.is_empty());
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_provider_adapter<T: ProviderAdapter>() {}
        fn _assert_embedding_adapter<T: EmbeddingAdapter>() {}
        fn _assert_vault_adapter<T: VaultAdapter>() {}
        fn _assert_memory_adapter<T: MemoryAdapter>() {}
    }
}
