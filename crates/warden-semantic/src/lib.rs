// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding-based semantic classification for Warden routing.
//!
//! The [`SemanticAnalyzer`] compares a query embedding against precomputed
//! exemplar embeddings to estimate intent, domain and tone, scores query
//! complexity, and extracts lexical context signals. When embeddings are
//! unavailable it degrades to [`heuristic_analysis`] instead of failing.

pub mod analysis;
pub mod analyzer;
pub mod cache;
pub mod exemplars;
pub mod heuristic;
pub mod signals;
pub mod vector;

pub use analysis::{ComplexityFactors, SemanticAnalysis};
pub use analyzer::{AnalyzerSettings, SemanticAnalyzer};
pub use cache::EmbeddingCache;
pub use exemplars::{Domain, Intent, Tone};
pub use heuristic::heuristic_analysis;
pub use signals::{ContextSignals, ReasoningNeeds, TemporalBucket};
