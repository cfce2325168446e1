// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-request pipeline.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use warden_config::WardenConfig;
use warden_context::{AssembledContext, ContextAssembler, ContextSources, estimate_tokens};
use warden_core::{
    CallQueue, EmbeddingAdapter, MemoryAdapter, Mode, ProviderAdapter, SessionId, VaultAdapter,
    WardenError,
};
use warden_cost::{Admission, AdmissionController, CostLedger};
use warden_enforcement::{ComplianceMetadata, EnforcementChain, StageContext};
use warden_router::{BackendSet, ConfidenceInputs, ModelRouter, RoutedOutcome, compute_confidence};
use warden_semantic::{AnalyzerSettings, EmbeddingCache, SemanticAnalysis, SemanticAnalyzer};

use crate::prompt::build_request;
use crate::request::{ContextReport, FallbackFlags, ProcessRequest, ProcessResponse, ResponseMetadata};

/// Returned when the pipeline fails; never a guessed answer.
pub const EMERGENCY_RESPONSE: &str = "Something went wrong while preparing this answer, so \
    no answer has been guessed. Please try again in a moment.";

/// Opens the response when no backend could answer.
pub const BACKEND_UNAVAILABLE_RESPONSE: &str = "No model backend could answer right now, so no \
    answer has been guessed. Please try again in a moment.";

/// Prefixed to responses that broke a hard business-protection rule.
pub const POLICY_NOTICE: &str = "[Policy notice] Parts of this response conflict with business \
    protection rules and have been flagged for review.";

/// Wires adapters and shared state into an [`Orchestrator`].
pub struct OrchestratorBuilder {
    config: WardenConfig,
    provider: Option<Arc<dyn ProviderAdapter>>,
    premium: Option<Arc<dyn ProviderAdapter>>,
    embedder: Option<Arc<dyn EmbeddingAdapter>>,
    memory: Option<Arc<dyn MemoryAdapter>>,
    vault: Option<Arc<dyn VaultAdapter>>,
    ledger: Option<Arc<CostLedger>>,
    cache: Option<Arc<EmbeddingCache>>,
    queue: Option<Arc<CallQueue>>,
    cancel: CancellationToken,
}

impl OrchestratorBuilder {
    /// Backend used for the default tier, and for premium unless overridden.
    pub fn provider(mut self, provider: Arc<dyn ProviderAdapter>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn premium_provider(mut self, provider: Arc<dyn ProviderAdapter>) -> Self {
        self.premium = Some(provider);
        self
    }

    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingAdapter>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn memory(mut self, memory: Arc<dyn MemoryAdapter>) -> Self {
        self.memory = Some(memory);
        self
    }

    pub fn vault(mut self, vault: Arc<dyn VaultAdapter>) -> Self {
        self.vault = Some(vault);
        self
    }

    pub fn ledger(mut self, ledger: Arc<CostLedger>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn cache(mut self, cache: Arc<EmbeddingCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn queue(mut self, queue: Arc<CallQueue>) -> Self {
        self.queue = Some(queue);
        self
    }

    /// Cancels semantic startup when triggered.
    pub fn cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Initialize the analyzer and build the pipeline.
    ///
    /// Fails only on missing adapters or invalid enforcement policy; an
    /// unreachable embedding service yields a degraded analyzer instead.
    pub async fn build(self) -> Result<Orchestrator, WardenError> {
        let config = self.config;
        let provider = self
            .provider
            .ok_or_else(|| WardenError::Config("no provider adapter configured".into()))?;
        let premium = self.premium.unwrap_or_else(|| Arc::clone(&provider));
        let embedder = self
            .embedder
            .ok_or_else(|| WardenError::Config("no embedding adapter configured".into()))?;

        let backends = &config.backends;
        let queue = self.queue.unwrap_or_else(|| {
            Arc::new(CallQueue::new(
                Duration::from_millis(backends.min_call_spacing_ms),
                backends.max_retries,
                Duration::from_millis(backends.base_backoff_ms),
            ))
        });
        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(EmbeddingCache::new(config.semantic.cache_max_entries)));
        let ledger = self.ledger.unwrap_or_else(|| Arc::new(CostLedger::new()));

        let chain = EnforcementChain::from_config(&config.enforcement)?;
        let analyzer = SemanticAnalyzer::initialize(
            embedder,
            Arc::clone(&queue),
            cache,
            AnalyzerSettings::from_config(&config),
            self.cancel,
        )
        .await;

        info!(
            agent_name = config.agent.name.as_str(),
            default_backend = config.backends.default_backend.as_str(),
            premium_backend = config.backends.premium_backend.as_str(),
            classifier_degraded = analyzer.is_degraded(),
            memory = self.memory.is_some(),
            vault = self.vault.is_some(),
            "orchestrator initialized"
        );

        Ok(Orchestrator {
            assembler: ContextAssembler::new(config.context.clone()),
            router: ModelRouter::from_config(&config, BackendSet { default: provider, premium }),
            admission: AdmissionController::from_config(ledger, &config.cost),
            analyzer,
            chain,
            queue,
            memory: self.memory,
            vault: self.vault,
            config,
        })
    }
}

/// Runs queries through context, classification, routing, dispatch and
/// enforcement.
pub struct Orchestrator {
    config: WardenConfig,
    assembler: ContextAssembler,
    analyzer: SemanticAnalyzer,
    router: ModelRouter,
    admission: AdmissionController,
    chain: EnforcementChain,
    queue: Arc<CallQueue>,
    memory: Option<Arc<dyn MemoryAdapter>>,
    vault: Option<Arc<dyn VaultAdapter>>,
}

impl Orchestrator {
    pub fn builder(config: WardenConfig) -> OrchestratorBuilder {
        OrchestratorBuilder {
            config,
            provider: None,
            premium: None,
            embedder: None,
            memory: None,
            vault: None,
            ledger: None,
            cache: None,
            queue: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn config(&self) -> &WardenConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Arc<CostLedger> {
        self.admission.ledger()
    }

    pub fn admission(&self) -> &AdmissionController {
        &self.admission
    }

    pub fn analyzer(&self) -> &SemanticAnalyzer {
        &self.analyzer
    }

    /// Process one query. Never fails.
    pub async fn process(&self, request: ProcessRequest) -> ProcessResponse {
        let started = Instant::now();
        let result = AssertUnwindSafe(self.run_pipeline(&request, started))
            .catch_unwind()
            .await;

        let failure = match result {
            Ok(Ok(response)) => return response,
            Ok(Err(e)) => e.to_string(),
            Err(payload) => format!("pipeline panicked: {}", panic_message(payload.as_ref())),
        };

        error!(
            session_id = request.session_id.as_str(),
            mode = %request.mode,
            error = failure.as_str(),
            "pipeline failed, returning emergency response"
        );
        emergency_response(&request, failure, started)
    }

    async fn run_pipeline(
        &self,
        request: &ProcessRequest,
        started: Instant,
    ) -> Result<ProcessResponse, WardenError> {
        let session = SessionId(request.session_id.clone());
        let mode = request.mode;
        let mut warnings = Vec::new();
        let mut fallback = FallbackFlags::default();

        self.ledger().ensure_session(&session, mode).await;

        let sources = ContextSources {
            memory: self.recall_memory(request, &mut warnings).await,
            documents: request.document_context.clone(),
            vault: self.resolve_vault(request, &mut warnings).await,
        };
        let context = self.assembler.assemble(&sources, mode);

        let analysis = self.analyze(&session, mode, &request.message).await?;
        fallback.classification_fallback = analysis.fallback_used;
        fallback.classifier_degraded = analysis.degraded;
        warnings.extend(analysis.warnings.iter().cloned());

        let confidence = compute_confidence(&ConfidenceInputs::from_analysis(
            &analysis,
            context.has_memory(),
            context.has_documents(),
            context.has_vault(),
        ));
        let decision = self.router.route(&analysis, &confidence, mode);

        let provider_request = build_request(
            &self.config.backends,
            mode,
            &context,
            &request.conversation_history,
            &request.message,
        );
        let outcome = self
            .router
            .dispatch(&decision, provider_request, &session, mode, &self.admission, &self.queue)
            .await?;

        let mut backend = None;
        let mut compliance = None;
        let mut final_confidence = confidence.value;
        let response_text = match outcome {
            RoutedOutcome::Denied { fallback: message, .. } => {
                fallback.admission_denied = true;
                warnings.push("session cost ceiling reached; model not called".to_string());
                message
            }
            RoutedOutcome::Unavailable { backends, errors } => {
                fallback.backend_unavailable = true;
                for (tried, err) in backends.iter().zip(&errors) {
                    warnings.push(format!("backend {tried} failed: {err}"));
                }
                format!("{BACKEND_UNAVAILABLE_RESPONSE} Tried: {}.", backends.join(", "))
            }
            RoutedOutcome::Completed(completion) => {
                if let Some(failover) = &completion.failover {
                    fallback.backend_failover = true;
                    warnings.push(format!(
                        "premium backend {} failed: {}",
                        failover.from, failover.error
                    ));
                }
                backend = Some(completion.backend);

                let stage_ctx = StageContext {
                    mode,
                    user_message: &request.message,
                    domain: analysis.domain,
                    intent: analysis.intent,
                    confidence: confidence.value,
                    vault: context.vault.as_deref(),
                };
                let enforced = self.chain.run(completion.response.content, &stage_ctx);
                final_confidence =
                    (confidence.value + enforced.metadata.confidence_delta()).clamp(0.0, 1.0);
                let text = validate_compliance(enforced.text, &enforced.metadata);
                compliance = Some(enforced.metadata);
                text
            }
        };

        let cost = self.admission.summary(&session, mode).await;
        let processing_ms = elapsed_ms(started);
        info!(
            session_id = %session,
            %mode,
            backend = backend.as_deref().unwrap_or("none"),
            confidence = confidence.value,
            final_confidence,
            session_total_usd = cost.total,
            admission_denied = fallback.admission_denied,
            backend_unavailable = fallback.backend_unavailable,
            processing_ms,
            "request processed"
        );

        Ok(ProcessResponse {
            success: true,
            response_text,
            metadata: ResponseMetadata {
                session_id: request.session_id.clone(),
                mode,
                context: Some(context_report(&context)),
                analysis: Some(analysis),
                confidence: Some(confidence),
                final_confidence: Some(final_confidence),
                routing: Some(decision),
                backend,
                cost: Some(cost),
                compliance,
                fallback,
                warnings,
                error: None,
                processing_ms,
            },
        })
    }

    /// Memory failures are tolerated: the request continues without memory.
    async fn recall_memory(&self, request: &ProcessRequest, warnings: &mut Vec<String>) -> Option<String> {
        let memory = self.memory.as_ref()?;
        match memory.recall(&request.user_id, &request.message).await {
            Ok(recall) if !recall.is_empty() => {
                debug!(count = recall.count, "memory recalled");
                Some(recall.text)
            }
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, user_id = request.user_id.as_str(), "memory recall failed, continuing without memory");
                warnings.push(format!("memory recall failed: {e}"));
                None
            }
        }
    }

    /// Caller-supplied vault text wins; otherwise the adapter's, once loaded.
    async fn resolve_vault(&self, request: &ProcessRequest, warnings: &mut Vec<String>) -> Option<String> {
        if let Some(text) = request.vault_context.as_ref().filter(|t| !t.trim().is_empty()) {
            return Some(text.clone());
        }
        let vault = self.vault.as_ref()?;
        match vault.load().await {
            Ok(content) if content.loaded && !content.text.trim().is_empty() => Some(content.text),
            Ok(_) => {
                debug!("vault not loaded, continuing without vault");
                None
            }
            Err(e) => {
                warn!(error = %e, "vault load failed, continuing without vault");
                warnings.push(format!("vault load failed: {e}"));
                None
            }
        }
    }

    /// Classify the query, admitting the embedding call against the session
    /// ceiling first. A denied embedding falls back to cached or heuristic
    /// analysis.
    async fn analyze(
        &self,
        session: &SessionId,
        mode: Mode,
        message: &str,
    ) -> Result<SemanticAnalysis, WardenError> {
        let Some(estimate) = self.analyzer.query_cost_estimate(message) else {
            return Ok(self.analyzer.analyze_cached(message).await);
        };

        let model = &self.config.openai.embedding_model;
        let reservation = match self.admission.admit(session, mode, model, estimate).await {
            Admission::Admitted(reservation) => reservation,
            Admission::Denied { .. } => {
                let mut analysis = self.analyzer.analyze_cached(message).await;
                analysis
                    .warnings
                    .push("session cost ceiling reached; query not embedded".to_string());
                return Ok(analysis);
            }
        };

        let analysis = match AssertUnwindSafe(self.analyzer.analyze(message))
            .catch_unwind()
            .await
        {
            Ok(analysis) => analysis,
            Err(payload) => {
                self.admission.release(reservation).await;
                std::panic::resume_unwind(payload);
            }
        };
        let input_tokens = u32::try_from(estimate_tokens(message)).unwrap_or(u32::MAX);
        self.admission
            .settle_embedding(reservation, input_tokens, analysis.cost_usd)
            .await?;
        Ok(analysis)
    }
}

fn validate_compliance(text: String, compliance: &ComplianceMetadata) -> String {
    if compliance.security_pass {
        text
    } else {
        format!("{POLICY_NOTICE}\n\n{text}")
    }
}

fn context_report(context: &AssembledContext) -> ContextReport {
    ContextReport {
        memory_tokens: context.memory_tokens,
        document_tokens: context.document_tokens,
        vault_tokens: context.vault_tokens,
        total_tokens: context.total_tokens(),
        has_memory: context.has_memory(),
        has_documents: context.has_documents(),
        has_vault: context.has_vault(),
        omitted_documents: context.omitted_documents.clone(),
        flags: context.flags.clone(),
    }
}

fn emergency_response(request: &ProcessRequest, failure: String, started: Instant) -> ProcessResponse {
    ProcessResponse {
        success: false,
        response_text: EMERGENCY_RESPONSE.to_string(),
        metadata: ResponseMetadata {
            session_id: request.session_id.clone(),
            mode: request.mode,
            fallback: FallbackFlags {
                emergency: true,
                ..FallbackFlags::default()
            },
            error: Some(failure),
            processing_ms: elapsed_ms(started),
            ..ResponseMetadata::default()
        },
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
