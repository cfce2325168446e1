// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-mode session ceilings and admission control.
//!
//! Every costly model call is admitted first. Admission reserves the
//! estimate so concurrent requests in one session cannot jointly overrun the
//! ceiling. A reservation is then settled with the actual cost or released.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use warden_config::model::{CeilingsConfig, CostConfig};
use warden_core::{Mode, SessionId, TokenUsage, WardenError};

use crate::ledger::{CostLedger, CostRecord, CostSource, CostSummary};

/// Result of comparing a proposed spend against a ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdmissionCheck {
    /// Dollars already recorded for the session.
    pub current_total: f64,
    /// Dollars held by outstanding reservations.
    pub reserved: f64,
    /// Estimated cost of the proposed call.
    pub estimated: f64,
    /// The mode's session ceiling.
    pub ceiling: f64,
    /// `current_total + reserved + estimated > ceiling`.
    pub would_exceed: bool,
}

impl AdmissionCheck {
    fn new(current_total: f64, reserved: f64, estimated: f64, ceiling: f64) -> Self {
        Self {
            current_total,
            reserved,
            estimated,
            ceiling,
            would_exceed: current_total + reserved + estimated > ceiling,
        }
    }
}

/// A held slice of a session's budget.
///
/// Pass it to [`AdmissionController::settle`] or
/// [`AdmissionController::release`]; dropping it leaks the hold until the
/// process exits.
#[derive(Debug, PartialEq)]
#[must_use = "a reservation must be settled or released"]
pub struct Reservation {
    session_id: SessionId,
    mode: Mode,
    backend: String,
    amount: f64,
}

impl Reservation {
    /// Dollars held.
    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// Backend or embedding model the hold was taken for.
    pub fn backend(&self) -> &str {
        &self.backend
    }
}

/// Outcome of [`AdmissionController::admit`].
#[derive(Debug, PartialEq)]
pub enum Admission {
    /// The estimate fits; the budget is held until settled or released.
    Admitted(Reservation),
    /// The estimate would exceed the ceiling; nothing was reserved.
    Denied {
        /// The numbers behind the denial.
        check: AdmissionCheck,
        /// Deterministic response to return instead of calling the model.
        fallback: String,
    },
}

/// Enforces per-mode session ceilings on top of the [`CostLedger`].
#[derive(Debug)]
pub struct AdmissionController {
    ledger: Arc<CostLedger>,
    ceilings: CeilingsConfig,
    warn_threshold_pct: f64,
}

impl AdmissionController {
    pub fn new(ledger: Arc<CostLedger>, ceilings: CeilingsConfig, warn_threshold_pct: f64) -> Self {
        Self {
            ledger,
            ceilings,
            warn_threshold_pct,
        }
    }

    pub fn from_config(ledger: Arc<CostLedger>, config: &CostConfig) -> Self {
        Self::new(ledger, config.ceilings.clone(), config.warn_threshold_pct)
    }

    pub fn ledger(&self) -> &Arc<CostLedger> {
        &self.ledger
    }

    /// Session ceiling for `mode`.
    pub fn ceiling(&self, mode: Mode) -> f64 {
        self.ceilings.for_mode(mode)
    }

    /// Would spending `estimate` now exceed the mode's ceiling?
    ///
    /// Read-only; outstanding reservations count as spent.
    pub async fn check(&self, session: &SessionId, mode: Mode, estimate: f64) -> AdmissionCheck {
        let (total, reserved) = self.ledger.exposure(session).await;
        AdmissionCheck::new(total, reserved, estimate, self.ceiling(mode))
    }

    /// Atomically check and reserve `estimate` for a call to `backend`.
    pub async fn admit(
        &self,
        session: &SessionId,
        mode: Mode,
        backend: &str,
        estimate: f64,
    ) -> Admission {
        let ceiling = self.ceiling(mode);
        let outcome = self.ledger.try_reserve(session, mode, estimate, ceiling).await;
        let check = AdmissionCheck::new(outcome.current_total, outcome.reserved, estimate, ceiling);

        if !outcome.reserved_after {
            info!(
                session_id = %session,
                %mode,
                backend,
                current_total = check.current_total,
                reserved = check.reserved,
                estimated = estimate,
                ceiling,
                "admission denied"
            );
            return Admission::Denied {
                fallback: budget_fallback_message(mode, &check),
                check,
            };
        }

        self.warn_if_near_ceiling(session, mode, check.current_total + check.reserved + estimate);
        Admission::Admitted(Reservation {
            session_id: session.clone(),
            mode,
            backend: backend.to_string(),
            amount: estimate,
        })
    }

    /// Replace a reservation with the call's actual cost.
    pub async fn settle(&self, reservation: Reservation, record: CostRecord) -> Result<f64, WardenError> {
        let total = self
            .ledger
            .settle(&reservation.session_id, reservation.amount, record)
            .await?;
        self.warn_if_near_ceiling(&reservation.session_id, reservation.mode, total);
        Ok(total)
    }

    /// Settle a reservation taken for a query embedding.
    ///
    /// The reservation's backend is recorded as the embedding model. A call
    /// that cost nothing (cache hit or failed embedding) is released instead
    /// of leaving a zero record.
    pub async fn settle_embedding(
        &self,
        reservation: Reservation,
        input_tokens: u32,
        cost_usd: f64,
    ) -> Result<f64, WardenError> {
        if cost_usd <= 0.0 {
            let session = reservation.session_id.clone();
            self.release(reservation).await;
            return Ok(self.ledger.session_total(&session).await);
        }
        let usage = TokenUsage {
            input_tokens,
            output_tokens: 0,
        };
        let record = CostRecord::new(
            &reservation.session_id,
            CostSource::Embedding,
            reservation.backend.clone(),
            &usage,
            cost_usd,
        );
        self.settle(reservation, record).await
    }

    /// Give a reservation back without recording a cost.
    pub async fn release(&self, reservation: Reservation) {
        self.ledger
            .release(&reservation.session_id, reservation.amount)
            .await;
    }

    /// Spend report against the mode's ceiling.
    pub async fn summary(&self, session: &SessionId, mode: Mode) -> CostSummary {
        self.ledger.summary(session, self.ceiling(mode)).await
    }

    fn warn_if_near_ceiling(&self, session: &SessionId, mode: Mode, exposure: f64) {
        let ceiling = self.ceiling(mode);
        if ceiling > 0.0 && exposure >= ceiling * self.warn_threshold_pct / 100.0 {
            warn!(
                session_id = %session,
                %mode,
                exposure,
                ceiling,
                threshold_pct = self.warn_threshold_pct,
                "approaching session cost ceiling"
            );
        }
    }
}

/// Response returned in place of a model answer when admission is denied.
pub fn budget_fallback_message(mode: Mode, check: &AdmissionCheck) -> String {
    format!(
        "This session has reached its {mode} spending limit (${:.4} spent of ${:.2}). \
         Answering would cost about ${:.4} more, so no model was called and no answer \
         has been guessed. Start a new session or raise the {mode} ceiling to continue.",
        check.current_total + check.reserved,
        check.ceiling,
        check.estimated,
    )
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use tracing_test::traced_test;
    use super::*;

    fn controller() -> AdmissionController {
        AdmissionController::from_config(Arc::new(CostLedger::new()), &CostConfig::default())
    }

    fn sid() -> SessionId {
        SessionId("session-1".to_string())
    }

    fn record(amount: f64) -> CostRecord {
        CostRecord::new(
            &sid(),
            CostSource::Completion,
            "gpt-4o",
            &TokenUsage {
                input_tokens: 100,
                output_tokens: 50,
            },
            amount,
        )
    }

    #[tokio::test]
    async fn check_reports_would_exceed() {
        let admission = controller();
        admission.ledger().record(record(0.20)).await.unwrap();

        let ok = admission.check(&sid(), Mode::TruthGeneral, 0.04).await;
        assert!(!ok.would_exceed);
        assert!((ok.ceiling - 0.25).abs() < f64::EPSILON);

        let over = admission.check(&sid(), Mode::TruthGeneral, 0.06).await;
        assert!(over.would_exceed);
        assert!((over.current_total - 0.20).abs() < 1e-12);
    }

    #[tokio::test]
    async fn denial_carries_deterministic_fallback() {
        let admission = controller();
        admission.ledger().record(record(0.25)).await.unwrap();

        match admission.admit(&sid(), Mode::TruthGeneral, "gpt-4o", 0.01).await {
            Admission::Denied { check, fallback } => {
                assert!(check.would_exceed);
                assert!(fallback.contains("truth_general spending limit"));
                assert_eq!(fallback, budget_fallback_message(Mode::TruthGeneral, &check));
            }
            Admission::Admitted(_) => panic!("should have been denied"),
        }
    }

    #[tokio::test]
    async fn settle_replaces_reservation_with_actual_cost() {
        let admission = controller();
        let Admission::Admitted(reservation) =
            admission.admit(&sid(), Mode::BusinessValidation, "gpt-4o", 0.10).await
        else {
            panic!("should be admitted");
        };
        assert_eq!(reservation.backend(), "gpt-4o");
        let pending = admission.check(&sid(), Mode::BusinessValidation, 0.0).await;
        assert!((pending.reserved - 0.10).abs() < 1e-12);

        let total = admission.settle(reservation, record(0.08)).await.unwrap();
        assert!((total - 0.08).abs() < 1e-12);
        let after = admission.check(&sid(), Mode::BusinessValidation, 0.0).await;
        assert_eq!(after.reserved, 0.0);
    }

    #[tokio::test]
    async fn release_returns_budget() {
        let admission = controller();
        let Admission::Admitted(reservation) =
            admission.admit(&sid(), Mode::TruthGeneral, "gpt-4o", 0.20).await
        else {
            panic!("should be admitted");
        };
        assert!(matches!(
            admission.admit(&sid(), Mode::TruthGeneral, "gpt-4o", 0.10).await,
            Admission::Denied { .. }
        ));
        admission.release(reservation).await;
        assert!(matches!(
            admission.admit(&sid(), Mode::TruthGeneral, "gpt-4o", 0.10).await,
            Admission::Admitted(_)
        ));
    }

    #[tokio::test]
    async fn embedding_is_admitted_and_settled_as_embedding_record() {
        let admission = controller();
        let Admission::Admitted(reservation) = admission
            .admit(&sid(), Mode::TruthGeneral, "text-embedding-3-small", 0.000_001)
            .await
        else {
            panic!("should be admitted");
        };
        let total = admission
            .settle_embedding(reservation, 12, 0.000_000_24)
            .await
            .unwrap();
        assert!((total - 0.000_000_24).abs() < 1e-15);

        let records = admission.ledger().records(&sid()).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source, CostSource::Embedding);
        assert_eq!(records[0].model, "text-embedding-3-small");
        assert_eq!(records[0].input_tokens, 12);
        assert_eq!(admission.check(&sid(), Mode::TruthGeneral, 0.0).await.reserved, 0.0);
    }

    #[tokio::test]
    async fn free_embedding_releases_without_record() {
        let admission = controller();
        let Admission::Admitted(reservation) = admission
            .admit(&sid(), Mode::TruthGeneral, "text-embedding-3-small", 0.000_001)
            .await
        else {
            panic!("should be admitted");
        };
        let total = admission.settle_embedding(reservation, 0, 0.0).await.unwrap();
        assert_eq!(total, 0.0);
        assert!(admission.ledger().records(&sid()).await.is_empty());
        assert_eq!(admission.check(&sid(), Mode::TruthGeneral, 0.0).await.reserved, 0.0);
    }

    #[tokio::test]
    async fn tiny_ceiling_denies_embedding() {
        let admission = AdmissionController::new(
            Arc::new(CostLedger::new()),
            CeilingsConfig {
                truth_general: 1e-9,
                ..CeilingsConfig::default()
            },
            80.0,
        );
        let outcome = admission
            .admit(&sid(), Mode::TruthGeneral, "text-embedding-3-small", 1.4e-7)
            .await;
        assert!(matches!(outcome, Admission::Denied { .. }));
        assert_eq!(admission.ledger().session_total(&sid()).await, 0.0);
    }

    #[tokio::test]
    #[traced_test]
    async fn warns_at_eighty_percent() {
        let admission = controller();
        let Admission::Admitted(reservation) =
            admission.admit(&sid(), Mode::TruthGeneral, "gpt-4o", 0.21).await
        else {
            panic!("should be admitted");
        };
        assert!(logs_contain("approaching session cost ceiling"));
        admission.release(reservation).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_admissions_never_overrun_ceiling() {
        let admission = Arc::new(controller());
        let tasks: Vec<_> = (0..40)
            .map(|_| {
                let admission = Arc::clone(&admission);
                tokio::spawn(async move {
                    match admission.admit(&sid(), Mode::TruthGeneral, "gpt-4o", 0.01).await {
                        Admission::Admitted(r) => {
                            admission.settle(r, record(0.01)).await.unwrap();
                            true
                        }
                        Admission::Denied { .. } => false,
                    }
                })
            })
            .collect();
        let admitted = futures::future::join_all(tasks)
            .await
            .into_iter()
            .filter(|r| matches!(r, Ok(true)))
            .count();

        let total = admission.ledger().session_total(&sid()).await;
        assert!(total <= 0.25 + 1e-9, "total {total} exceeded ceiling");
        assert!(admitted >= 24 && admitted <= 25, "admitted {admitted}");
    }

    proptest! {
        #[test]
        fn would_exceed_matches_formula(spent in 0.0f64..1.0, estimate in 0.0f64..1.0) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            rt.block_on(async {
                let admission = controller();
                if spent > 0.0 {
                    admission.ledger().record(record(spent)).await.unwrap();
                }
                let check = admission.check(&sid(), Mode::SiteMonkeys, estimate).await;
                prop_assert_eq!(check.would_exceed, spent + estimate > 1.0);
                Ok(())
            })?;
        }
    }
}
