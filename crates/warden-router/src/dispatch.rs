// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Admission-gated backend invocation with a single premium failover.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde::Serialize;
use tracing::{info, warn};
use warden_context::estimate_tokens;
use warden_core::types::{ProviderRequest, ProviderResponse};
use warden_core::{CallQueue, Mode, ProviderAdapter, SessionId, WardenError};
use warden_cost::{Admission, AdmissionCheck, AdmissionController, CostRecord, CostSource};

use crate::router::{BackendTier, ModelRouter, RoutingDecision};

/// A premium call that failed and was retried on the default backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Failover {
    pub from: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Completion {
    pub response: ProviderResponse,
    /// Backend that actually produced the response.
    pub backend: String,
    pub tier: BackendTier,
    pub cost_usd: f64,
    pub failover: Option<Failover>,
}

/// What [`ModelRouter::dispatch`] produced.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RoutedOutcome {
    Completed(Completion),
    /// Admission refused the call; no backend was invoked.
    Denied {
        check: AdmissionCheck,
        fallback: String,
        backend: String,
    },
    /// Every backend tried failed with an external error.
    Unavailable {
        /// Backends tried, in order.
        backends: Vec<String>,
        /// One error per tried backend.
        errors: Vec<String>,
    },
}

impl ModelRouter {
    /// Invoke the backend chosen by `decision`.
    ///
    /// Every attempt is admitted against the session ceiling first and its
    /// actual cost is settled afterwards. An external failure on the premium
    /// tier is retried once on the default tier. When no backend could
    /// answer the result is [`RoutedOutcome::Unavailable`]; only internal
    /// errors are returned as `Err`.
    pub async fn dispatch(
        &self,
        decision: &RoutingDecision,
        request: ProviderRequest,
        session: &SessionId,
        mode: Mode,
        admission: &AdmissionController,
        queue: &CallQueue,
    ) -> Result<RoutedOutcome, WardenError> {
        let first_backend = self.backend_id(decision.tier).to_string();
        let first_err = match self
            .invoke(decision.tier, &request, session, mode, admission, queue)
            .await
        {
            Err(err) if err.is_external() => err,
            other => return other,
        };

        if decision.tier != BackendTier::Premium {
            warn!(
                session_id = %session,
                backend = first_backend.as_str(),
                error = %first_err,
                "backend failed, no answer available"
            );
            return Ok(RoutedOutcome::Unavailable {
                backends: vec![first_backend],
                errors: vec![first_err.to_string()],
            });
        }

        let fallback_backend = self.backend_id(BackendTier::Default).to_string();
        warn!(
            session_id = %session,
            from = first_backend.as_str(),
            to = fallback_backend.as_str(),
            error = %first_err,
            "premium backend failed, failing over"
        );
        match self
            .invoke(BackendTier::Default, &request, session, mode, admission, queue)
            .await
        {
            Ok(RoutedOutcome::Completed(mut completion)) => {
                completion.failover = Some(Failover {
                    from: first_backend,
                    error: first_err.to_string(),
                });
                Ok(RoutedOutcome::Completed(completion))
            }
            Err(err) if err.is_external() => {
                warn!(
                    session_id = %session,
                    backend = fallback_backend.as_str(),
                    error = %err,
                    "failover backend failed, no answer available"
                );
                Ok(RoutedOutcome::Unavailable {
                    backends: vec![first_backend, fallback_backend],
                    errors: vec![first_err.to_string(), err.to_string()],
                })
            }
            other => other,
        }
    }

    async fn invoke(
        &self,
        tier: BackendTier,
        request: &ProviderRequest,
        session: &SessionId,
        mode: Mode,
        admission: &AdmissionController,
        queue: &CallQueue,
    ) -> Result<RoutedOutcome, WardenError> {
        let backend = self.backend_id(tier).to_string();
        let mut request = request.clone();
        request.model = backend.clone();

        let input_tokens = prompt_tokens(&request);
        let estimate = self.rates.estimate(&backend, input_tokens, request.max_tokens);

        let reservation = match admission.admit(session, mode, &backend, estimate).await {
            Admission::Admitted(reservation) => reservation,
            Admission::Denied { check, fallback } => {
                return Ok(RoutedOutcome::Denied {
                    check,
                    fallback,
                    backend,
                });
            }
        };

        let provider: &Arc<dyn ProviderAdapter> = self.providers.get(tier);
        let call = queue.run(&backend, || {
            let provider = Arc::clone(provider);
            let request = request.clone();
            async move { provider.complete(request).await }
        });

        let response = match AssertUnwindSafe(call).catch_unwind().await {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => {
                admission.release(reservation).await;
                return Err(err);
            }
            Err(payload) => {
                admission.release(reservation).await;
                std::panic::resume_unwind(payload);
            }
        };

        let cost = self.rates.cost(&backend, &response.usage);
        let record = CostRecord::new(session, CostSource::Completion, &backend, &response.usage, cost);
        let total = admission.settle(reservation, record).await?;

        info!(
            session_id = %session,
            backend = backend.as_str(),
            %tier,
            estimated_usd = estimate,
            cost_usd = cost,
            session_total_usd = total,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "completion recorded"
        );

        Ok(RoutedOutcome::Completed(Completion {
            response,
            backend,
            tier,
            cost_usd: cost,
            failover: None,
        }))
    }
}

fn prompt_tokens(request: &ProviderRequest) -> u32 {
    let system = request.system_prompt.as_deref().map(estimate_tokens).unwrap_or(0);
    let messages: usize = request.messages.iter().map(|m| estimate_tokens(&m.content)).sum();
    u32::try_from(system + messages).unwrap_or(u32::MAX)
}
