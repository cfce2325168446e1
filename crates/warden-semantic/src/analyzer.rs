// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The semantic analyzer: reference embeddings, classification, and fallback.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use warden_config::WardenConfig;
use warden_context::estimate_tokens;
use warden_core::types::{EmbeddingInput, EmbeddingOutput};
use warden_core::{CallQueue, EmbeddingAdapter, WardenError};

use crate::analysis::{ComplexityFactors, SemanticAnalysis};
use crate::cache::EmbeddingCache;
use crate::exemplars::{Domain, Intent, Reference, Tone};
use crate::heuristic::heuristic_analysis;
use crate::signals;
use crate::vector::{cosine_similarity, is_zero, similarity_to_confidence};

/// Confidence reported for a sub-step that fell back to its neutral default.
const NEUTRAL_CONFIDENCE: f64 = 0.5;

type ReferenceTask = (Reference, Result<EmbeddingOutput, WardenError>);

/// Tunables for the analyzer, lifted from [`WardenConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerSettings {
    /// Deadline for computing every reference embedding at startup.
    pub init_timeout: Duration,
    /// Length of the zero vectors used when references are unavailable.
    pub embedding_dimensions: usize,
    /// Ceiling on embedding-derived confidences while degraded.
    pub degraded_confidence_cap: f64,
    /// Similarity to the technical exemplar above which expertise is required.
    pub expertise_similarity: f64,
    /// USD per million embedding tokens.
    pub embedding_per_mtok: f64,
}

impl AnalyzerSettings {
    pub fn from_config(config: &WardenConfig) -> Self {
        Self {
            init_timeout: Duration::from_secs(config.semantic.init_timeout_secs),
            embedding_dimensions: config.semantic.embedding_dimensions,
            degraded_confidence_cap: config.semantic.degraded_confidence_cap,
            expertise_similarity: config.routing.expertise_similarity,
            embedding_per_mtok: config.cost.embedding_per_mtok,
        }
    }
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self::from_config(&WardenConfig::default())
    }
}

struct QueryEmbedding {
    vector: Vec<f32>,
    cache_hit: bool,
    cost_usd: f64,
}

/// Classifies queries against precomputed exemplar embeddings.
pub struct SemanticAnalyzer {
    embedder: Arc<dyn EmbeddingAdapter>,
    queue: Arc<CallQueue>,
    cache: Arc<EmbeddingCache>,
    references: HashMap<Reference, Vec<f32>>,
    degraded: bool,
    settings: AnalyzerSettings,
}

impl SemanticAnalyzer {
    /// Precompute every reference embedding concurrently.
    ///
    /// Never fails: on timeout, cancellation or any embedding error all
    /// references become zero vectors and the analyzer runs degraded.
    pub async fn initialize(
        embedder: Arc<dyn EmbeddingAdapter>,
        queue: Arc<CallQueue>,
        cache: Arc<EmbeddingCache>,
        settings: AnalyzerSettings,
        cancel: CancellationToken,
    ) -> Self {
        let computed = compute_references(&embedder, &queue, settings.init_timeout, &cancel).await;
        let (references, degraded) = match computed {
            Ok(references) => {
                info!(count = references.len(), "semantic reference embeddings ready");
                (references, false)
            }
            Err(e) => {
                warn!(
                    error = %e,
                    cap = settings.degraded_confidence_cap,
                    "reference embeddings unavailable, classifier degraded"
                );
                let zero = vec![0.0; settings.embedding_dimensions];
                let references = Reference::all().map(|r| (r, zero.clone())).collect();
                (references, true)
            }
        };

        Self {
            embedder,
            queue,
            cache,
            references,
            degraded,
            settings,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn cache(&self) -> &Arc<EmbeddingCache> {
        &self.cache
    }

    /// Estimated cost of embedding `text`, or `None` when it is cached.
    pub fn query_cost_estimate(&self, text: &str) -> Option<f64> {
        if self.cache.get(text).is_some() {
            return None;
        }
        Some(estimate_tokens(text) as f64 * self.settings.embedding_per_mtok / 1_000_000.0)
    }

    /// Analyze one query.
    ///
    /// Never fails. If the query cannot be embedded the regex-only
    /// [`heuristic_analysis`] is returned with `fallback_used` set.
    pub async fn analyze(&self, text: &str) -> SemanticAnalysis {
        self.analyze_with(text, true).await
    }

    /// Analyze without calling the embedding service.
    ///
    /// Uses a cached query vector when there is one, otherwise the heuristic
    /// fallback.
    pub async fn analyze_cached(&self, text: &str) -> SemanticAnalysis {
        self.analyze_with(text, false).await
    }

    async fn analyze_with(&self, text: &str, live: bool) -> SemanticAnalysis {
        let query = match self.embed_query(text, live).await {
            Ok(query) => query,
            Err(e) => {
                if matches!(e, WardenError::BudgetExhausted { .. }) {
                    info!("query embedding not admitted, using heuristic analysis");
                } else {
                    warn!(error = %e, "query embedding failed, using heuristic analysis");
                }
                let mut analysis = heuristic_analysis(text);
                analysis.degraded = self.degraded;
                analysis.intent_confidence = self.cap(analysis.intent_confidence);
                analysis.domain_confidence = self.cap(analysis.domain_confidence);
                analysis.tone_weight = self.cap(analysis.tone_weight);
                analysis.warnings.push(format!("query embedding unavailable: {e}"));
                return analysis;
            }
        };

        let mut warnings = Vec::new();
        let (intent, intent_confidence) = self
            .classify(&query.vector, &Intent::ALL, Reference::Intent)
            .unwrap_or_else(|e| self.neutral(&mut warnings, "intent", e, Intent::Question));
        let (domain, domain_confidence) = self
            .classify(&query.vector, &Domain::ALL, Reference::Domain)
            .unwrap_or_else(|e| self.neutral(&mut warnings, "domain", e, Domain::General));
        let (tone, tone_weight) = self
            .classify(&query.vector, &Tone::ALL, Reference::Tone)
            .unwrap_or_else(|e| self.neutral(&mut warnings, "tone", e, Tone::Neutral));

        let technical = self.similarity(&query.vector, Reference::Domain(Domain::Technical));
        let factors =
            ComplexityFactors::lexical(text, technical > self.settings.expertise_similarity);

        debug!(
            %intent,
            intent_confidence,
            %domain,
            domain_confidence,
            complexity = factors.score(),
            cache_hit = query.cache_hit,
            "query analyzed"
        );

        SemanticAnalysis {
            intent,
            intent_confidence,
            domain,
            domain_confidence,
            complexity: factors.score(),
            complexity_factors: factors,
            tone,
            tone_weight,
            signals: signals::context_signals(text),
            reasoning: signals::reasoning_needs(text),
            cache_hit: query.cache_hit,
            cost_usd: query.cost_usd,
            fallback_used: false,
            degraded: self.degraded,
            warnings,
        }
    }

    async fn embed_query(&self, text: &str, live: bool) -> Result<QueryEmbedding, WardenError> {
        if let Some(vector) = self.cache.get(text) {
            return Ok(QueryEmbedding {
                vector,
                cache_hit: true,
                cost_usd: 0.0,
            });
        }
        if !live {
            return Err(WardenError::BudgetExhausted {
                message: "query embedding not admitted".to_string(),
            });
        }

        let output = self
            .queue
            .run("query_embedding", || {
                let embedder = Arc::clone(&self.embedder);
                let input = EmbeddingInput::single(text);
                async move { embedder.embed(input).await }
            })
            .await?;

        let tokens = output
            .total_tokens
            .map(|t| t as usize)
            .unwrap_or_else(|| estimate_tokens(text));
        let vector = first_vector(output)?;
        self.cache.insert(text, vector.clone());

        Ok(QueryEmbedding {
            vector,
            cache_hit: false,
            cost_usd: tokens as f64 * self.settings.embedding_per_mtok / 1_000_000.0,
        })
    }

    /// Best-matching label and its confidence.
    ///
    /// Errors when no reference vector is comparable with the query, which
    /// is always the case while degraded.
    fn classify<T: Copy>(
        &self,
        query: &[f32],
        labels: &[T],
        key: fn(T) -> Reference,
    ) -> Result<(T, f64), WardenError> {
        let mut best: Option<(T, f64)> = None;
        for &label in labels {
            let Some(reference) = self.references.get(&key(label)) else {
                continue;
            };
            if is_zero(reference) || reference.len() != query.len() {
                continue;
            }
            let sim = cosine_similarity(query, reference);
            if best.is_none_or(|(_, b)| sim > b) {
                best = Some((label, sim));
            }
        }
        let (label, sim) = best.ok_or_else(|| {
            WardenError::Internal("no reference vector comparable with the query".to_string())
        })?;
        Ok((label, self.cap(similarity_to_confidence(sim))))
    }

    fn similarity(&self, query: &[f32], reference: Reference) -> f64 {
        self.references
            .get(&reference)
            .map(|r| cosine_similarity(query, r))
            .unwrap_or(0.0)
    }

    fn neutral<T>(&self, warnings: &mut Vec<String>, step: &str, err: WardenError, default: T) -> (T, f64) {
        if !self.degraded {
            warn!(step, error = %err, "classification step fell back to neutral default");
        }
        warnings.push(format!("{step} classification unavailable: {err}"));
        (default, self.cap(NEUTRAL_CONFIDENCE))
    }

    fn cap(&self, confidence: f64) -> f64 {
        let confidence = confidence.clamp(0.0, 1.0);
        if self.degraded {
            confidence.min(self.settings.degraded_confidence_cap)
        } else {
            confidence
        }
    }
}

async fn compute_references(
    embedder: &Arc<dyn EmbeddingAdapter>,
    queue: &Arc<CallQueue>,
    deadline: Duration,
    cancel: &CancellationToken,
) -> Result<HashMap<Reference, Vec<f32>>, WardenError> {
    let mut set: JoinSet<ReferenceTask> = JoinSet::new();
    for reference in Reference::all() {
        let embedder = Arc::clone(embedder);
        let queue = Arc::clone(queue);
        set.spawn(async move {
            let output = queue
                .run("reference_embedding", || {
                    let embedder = Arc::clone(&embedder);
                    async move {
                        embedder
                            .embed(EmbeddingInput::single(reference.exemplar()))
                            .await
                    }
                })
                .await;
            (reference, output)
        });
    }

    let result = tokio::select! {
        _ = cancel.cancelled() => {
            Err(WardenError::Internal("semantic initialization cancelled".to_string()))
        }
        joined = tokio::time::timeout(deadline, collect_references(&mut set)) => {
            joined.unwrap_or(Err(WardenError::Timeout { duration: deadline }))
        }
    };
    if result.is_err() {
        set.abort_all();
    }
    result
}

async fn collect_references(
    set: &mut JoinSet<ReferenceTask>,
) -> Result<HashMap<Reference, Vec<f32>>, WardenError> {
    let mut references = HashMap::new();
    let mut dimensions: Option<usize> = None;
    while let Some(joined) = set.join_next().await {
        let (reference, output) = joined
            .map_err(|e| WardenError::Internal(format!("reference embedding task failed: {e}")))?;
        let vector = first_vector(output?)?;
        match dimensions {
            Some(d) if d != vector.len() => {
                return Err(WardenError::embedding(format!(
                    "reference dimensions differ: {d} vs {}",
                    vector.len()
                )));
            }
            _ => dimensions = Some(vector.len()),
        }
        references.insert(reference, vector);
    }
    Ok(references)
}

fn first_vector(output: EmbeddingOutput) -> Result<Vec<f32>, WardenError> {
    output
        .embeddings
        .into_iter()
        .next()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| WardenError::embedding("embedding response contained no vector"))
}
