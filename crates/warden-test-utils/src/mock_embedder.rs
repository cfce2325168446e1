// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock embedding service.
//!
//! Each vector counts how many words of the text fall in each keyword
//! group, plus a constant bias component so no text embeds to zero. Texts
//! sharing vocabulary with an exemplar therefore land close to it.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use warden_core::types::{AdapterType, EmbeddingInput, EmbeddingOutput, HealthStatus};
use warden_core::{EmbeddingAdapter, PluginAdapter, WardenError};

const BIAS: f32 = 0.5;

const KEYWORD_GROUPS: &[&[&str]] = &[
    // intents
    &["what", "how", "why", "where", "when", "who", "understand", "learn", "answer", "explain"],
    &["do", "task", "list", "summarize", "convert", "send", "update", "generate", "make"],
    &["should", "choose", "option", "decide", "weigh", "tradeoffs", "pick", "best", "versus"],
    &["broken", "fix", "problem", "solve", "issue", "troubleshoot", "error", "failing", "bug"],
    &["write", "create", "design", "brainstorm", "ideas", "draft", "story", "invent", "slogan"],
    &["frustrating", "unacceptable", "annoyed", "disappointed", "badly"],
    &["hi", "hello", "hey", "thanks", "chatting"],
    // domains
    &["business", "strategy", "customers", "marketing", "sales", "operations", "growth", "competitors", "company"],
    &[
        "software", "engineering", "code", "api", "apis", "database", "databases", "server", "servers",
        "architecture", "algorithms", "debugging",
    ],
    &[
        "money", "revenue", "profit", "roi", "margin", "margins", "pricing", "price", "budget", "cash",
        "flow", "investment", "taxes",
    ],
    &["contracts", "contract", "law", "liability", "compliance", "regulations", "lawsuits", "legal", "rights"],
    &["health", "medical", "symptoms", "doctors", "medication", "diet", "exercise", "sleep", "wellbeing"],
    &["family", "relationships", "friends", "feelings", "personal", "life", "private"],
    &["general", "knowledge", "everyday", "facts", "trivia", "common", "topics"],
    // tones
    &["great", "excited", "happy", "love", "thank", "awesome"],
    &["bad", "disappointing", "hate", "terrible", "awful"],
    &["urgent", "immediately", "asap", "now", "deadline", "today"],
    &["worried", "nervous", "scared", "stressed", "unsure", "afraid"],
    &["please", "provide", "information", "details", "request"],
];

/// Deterministic keyword-bag embedder.
pub struct MockEmbedder {
    delay: Option<Duration>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl MockEmbedder {
    pub fn new() -> Self {
        Self {
            delay: None,
            failing: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    /// Every call fails with an embedding error.
    pub fn failing() -> Self {
        let embedder = Self::new();
        embedder.set_failing(true);
        embedder
    }

    /// Sleep before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn dimensions() -> usize {
        KEYWORD_GROUPS.len() + 1
    }

    /// The vector this embedder produces for `text`.
    pub fn vector_for(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; Self::dimensions()];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
        {
            for (i, group) in KEYWORD_GROUPS.iter().enumerate() {
                if group.contains(&word.as_str()) {
                    vector[i] += 1.0;
                }
            }
        }
        vector[KEYWORD_GROUPS.len()] = BIAS;
        vector
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockEmbedder {
    fn name(&self) -> &str {
        "mock-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, WardenError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl EmbeddingAdapter for MockEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, WardenError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(WardenError::embedding("mock embedder failure"));
        }

        let words: usize = input
            .texts
            .iter()
            .map(|t| t.split_whitespace().count())
            .sum();
        Ok(EmbeddingOutput {
            embeddings: input.texts.iter().map(|t| Self::vector_for(t)).collect(),
            dimensions: Self::dimensions(),
            total_tokens: Some(u32::try_from(words.max(1)).unwrap_or(u32::MAX)),
        })
    }
}
