// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by adapters and pipeline stages.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Caller-supplied identifier for a conversation session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of upstream collaborator an adapter talks to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Provider,
    Embedding,
    Vault,
    Memory,
}

/// Token usage reported by a chat-completion backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Prompt tokens consumed.
    pub input_tokens: u32,
    /// Completion tokens generated.
    pub output_tokens: u32,
}

/// A single turn in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// "user", "assistant" or "system".
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// A request to a chat-completion backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// Backend/model identifier (e.g. "gpt-4o-mini").
    pub model: String,
    /// System prompt carrying mode preamble and assembled context.
    pub system_prompt: Option<String>,
    /// Conversation history followed by the current user message.
    pub messages: Vec<ChatMessage>,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

/// A completed response from a chat-completion backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// Provider-assigned response identifier.
    pub id: String,
    /// Generated text.
    pub content: String,
    /// Model that produced the response.
    pub model: String,
    /// Reported token usage.
    pub usage: TokenUsage,
}

/// Input for an embedding adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingInput {
    /// Texts to embed, one vector per text.
    pub texts: Vec<String>,
}

impl EmbeddingInput {
    pub fn single(text: impl Into<String>) -> Self {
        Self {
            texts: vec![text.into()],
        }
    }
}

/// Output from an embedding adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingOutput {
    /// One vector per input text, in input order.
    pub embeddings: Vec<Vec<f32>>,
    /// Vector dimensionality.
    pub dimensions: usize,
    /// Tokens billed for this call, if the service reports them.
    pub total_tokens: Option<u32>,
}

/// Vault content returned by a vault adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultContent {
    /// Raw vault text.
    pub text: String,
    /// Whether the vault finished loading and is healthy.
    pub loaded: bool,
}

/// Prior relevant text recalled from persistent memory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryRecall {
    /// Concatenated memory text.
    pub text: String,
    /// Number of memories that contributed to `text`.
    pub count: usize,
}

impl MemoryRecall {
    pub fn is_empty(&self) -> bool {
        self.count == 0 || self.text.trim().is_empty()
    }
}
