// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Warden orchestration engine.

use std::time::Duration;

use thiserror::Error;

/// The primary error type used across all Warden adapters and pipeline stages.
#[derive(Debug, Error)]
pub enum WardenError {
    /// Configuration errors (invalid TOML, missing required fields, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Chat-completion backend errors (API failure, malformed response).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Embedding service errors.
    #[error("embedding error: {message}")]
    Embedding {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The upstream service asked us to slow down (HTTP 429).
    #[error("rate limited by upstream service")]
    RateLimited { retry_after: Option<Duration> },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: Duration },

    /// A session spending ceiling would be exceeded.
    #[error("budget exhausted: {message}")]
    BudgetExhausted { message: String },

    /// A single enforcement stage failed internally.
    #[error("enforcement stage `{stage}` failed: {message}")]
    Enforcement { stage: String, message: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl WardenError {
    /// Shorthand for a provider error without an underlying source.
    pub fn provider(message: impl Into<String>) -> Self {
        WardenError::Provider {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for an embedding error without an underlying source.
    pub fn embedding(message: impl Into<String>) -> Self {
        WardenError::Embedding {
            message: message.into(),
            source: None,
        }
    }

    /// True for failures of an external embedding or model service.
    ///
    /// These are always recovered locally with a deterministic substitute.
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            WardenError::Provider { .. }
                | WardenError::Embedding { .. }
                | WardenError::RateLimited { .. }
                | WardenError::Timeout { .. }
        )
    }
}
