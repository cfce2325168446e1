// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory per-session cost ledger.
//!
//! Records are immutable once appended and a session's running total only
//! ever grows. Admission reservations live beside the totals under the same
//! lock so check-and-reserve is atomic.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tokio::sync::Mutex;
use tracing::info;
use warden_core::{Mode, SessionId, TokenUsage, WardenError};

/// What incurred a cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CostSource {
    /// Query embedding during semantic analysis.
    Embedding,
    /// Chat completion on a backend.
    Completion,
}

/// One charge against a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRecord {
    /// UUID v4.
    pub id: String,
    /// Session the charge belongs to.
    pub session_id: String,
    /// Whether this was an embedding or a completion.
    pub source: CostSource,
    /// Backend or embedding model that was billed.
    pub model: String,
    /// Charge in US dollars.
    pub amount_usd: f64,
    /// Prompt or embedding input tokens.
    pub input_tokens: u32,
    /// Completion tokens; zero for embeddings.
    pub output_tokens: u32,
    /// ISO 8601 timestamp.
    pub created_at: String,
}

impl CostRecord {
    /// Create a record with a fresh id and the current timestamp.
    pub fn new(
        session_id: &SessionId,
        source: CostSource,
        model: impl Into<String>,
        usage: &TokenUsage,
        amount_usd: f64,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: session_id.0.clone(),
            source,
            model: model.into(),
            amount_usd,
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
            created_at: now_iso8601(),
        }
    }

    /// Key used in [`CostSummary::breakdown`].
    pub fn label(&self) -> String {
        format!("{}:{}", self.source, self.model)
    }
}

/// Point-in-time view of a session, without its records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Caller-supplied session id.
    pub id: String,
    /// Mode the session was first seen in.
    pub mode: Mode,
    /// ISO 8601 creation timestamp.
    pub created_at: String,
    /// Sum of every recorded charge.
    pub total_usd: f64,
    /// Budget held by outstanding admission reservations.
    pub reserved_usd: f64,
    /// Number of recorded charges.
    pub record_count: usize,
}

/// Spend report for a session against its ceiling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostSummary {
    /// Dollars spent so far.
    pub total: f64,
    /// The mode's session ceiling.
    pub ceiling: f64,
    /// `total / ceiling` as a percentage.
    pub percent_used: f64,
    /// Dollars left before the ceiling, never negative.
    pub remaining: f64,
    /// Spend per `source:model` label.
    pub breakdown: BTreeMap<String, f64>,
}

#[derive(Debug)]
struct SessionState {
    mode: Mode,
    created_at: String,
    total_usd: f64,
    reserved_usd: f64,
    records: Vec<CostRecord>,
}

impl SessionState {
    fn new(mode: Mode) -> Self {
        Self {
            mode,
            created_at: now_iso8601(),
            total_usd: 0.0,
            reserved_usd: 0.0,
            records: Vec::new(),
        }
    }

    fn info(&self, id: &str) -> SessionInfo {
        SessionInfo {
            id: id.to_string(),
            mode: self.mode,
            created_at: self.created_at.clone(),
            total_usd: self.total_usd,
            reserved_usd: self.reserved_usd,
            record_count: self.records.len(),
        }
    }

    fn append(&mut self, record: CostRecord) {
        self.total_usd += record.amount_usd;
        self.records.push(record);
    }
}

/// Outcome of an atomic check-and-reserve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ReserveOutcome {
    pub current_total: f64,
    pub reserved: f64,
    pub reserved_after: bool,
}

/// In-memory ledger shared by every request in the process.
///
/// Uses a `tokio::sync::Mutex` so concurrent updates to one session apply
/// in the order callers reached the lock. The lock is never held across a
/// network call.
#[derive(Debug, Default)]
pub struct CostLedger {
    sessions: Mutex<HashMap<String, SessionState>>,
}

impl CostLedger {
    /// An empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the session on first sight; later calls return it unchanged.
    pub async fn ensure_session(&self, id: &SessionId, mode: Mode) -> SessionInfo {
        let mut sessions = self.sessions.lock().await;
        sessions
            .entry(id.0.clone())
            .or_insert_with(|| SessionState::new(mode))
            .info(&id.0)
    }

    /// Snapshot of a session, if it exists.
    pub async fn session(&self, id: &SessionId) -> Option<SessionInfo> {
        let sessions = self.sessions.lock().await;
        sessions.get(&id.0).map(|s| s.info(&id.0))
    }

    /// Append a record and return the session's new total.
    ///
    /// Unknown sessions are created with the default mode.
    pub async fn record(&self, record: CostRecord) -> Result<f64, WardenError> {
        validate_amount(record.amount_usd)?;
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .entry(record.session_id.clone())
            .or_insert_with(|| SessionState::new(Mode::default()));
        info!(
            session_id = %record.session_id,
            source = %record.source,
            model = %record.model,
            amount_usd = record.amount_usd,
            input_tokens = record.input_tokens,
            output_tokens = record.output_tokens,
            "cost recorded"
        );
        session.append(record);
        Ok(session.total_usd)
    }

    /// Running total for a session; zero for unknown sessions.
    pub async fn session_total(&self, id: &SessionId) -> f64 {
        let sessions = self.sessions.lock().await;
        sessions.get(&id.0).map(|s| s.total_usd).unwrap_or(0.0)
    }

    /// Every record for a session, oldest first.
    pub async fn records(&self, id: &SessionId) -> Vec<CostRecord> {
        let sessions = self.sessions.lock().await;
        sessions
            .get(&id.0)
            .map(|s| s.records.clone())
            .unwrap_or_default()
    }

    /// Spend report for a session against `ceiling`.
    pub async fn summary(&self, id: &SessionId, ceiling: f64) -> CostSummary {
        let sessions = self.sessions.lock().await;
        let Some(session) = sessions.get(&id.0) else {
            return summarize(0.0, ceiling, BTreeMap::new());
        };
        let mut breakdown = BTreeMap::new();
        for record in &session.records {
            *breakdown.entry(record.label()).or_insert(0.0) += record.amount_usd;
        }
        summarize(session.total_usd, ceiling, breakdown)
    }

    /// Reserve `amount` unless `total + reserved + amount` would exceed `ceiling`.
    pub(crate) async fn try_reserve(
        &self,
        id: &SessionId,
        mode: Mode,
        amount: f64,
        ceiling: f64,
    ) -> ReserveOutcome {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .entry(id.0.clone())
            .or_insert_with(|| SessionState::new(mode));
        let current_total = session.total_usd;
        let reserved = session.reserved_usd;
        let admitted = current_total + reserved + amount <= ceiling;
        if admitted {
            session.reserved_usd += amount;
        }
        ReserveOutcome {
            current_total,
            reserved,
            reserved_after: admitted,
        }
    }

    /// Current total and outstanding reservations for a session.
    pub(crate) async fn exposure(&self, id: &SessionId) -> (f64, f64) {
        let sessions = self.sessions.lock().await;
        sessions
            .get(&id.0)
            .map(|s| (s.total_usd, s.reserved_usd))
            .unwrap_or((0.0, 0.0))
    }

    /// Drop a reservation and append its actual cost in one step.
    pub(crate) async fn settle(
        &self,
        id: &SessionId,
        reserved: f64,
        record: CostRecord,
    ) -> Result<f64, WardenError> {
        validate_amount(record.amount_usd)?;
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(&id.0)
            .ok_or_else(|| WardenError::Internal(format!("no reservation for session {id}")))?;
        session.reserved_usd = (session.reserved_usd - reserved).max(0.0);
        info!(
            session_id = %id,
            model = %record.model,
            estimated_usd = reserved,
            amount_usd = record.amount_usd,
            "reservation settled"
        );
        session.append(record);
        Ok(session.total_usd)
    }

    pub(crate) async fn release(&self, id: &SessionId, reserved: f64) {
        let mut sessions = self.sessions.lock().await;
        if let Some(session) = sessions.get_mut(&id.0) {
            session.reserved_usd = (session.reserved_usd - reserved).max(0.0);
        }
    }
}

fn validate_amount(amount: f64) -> Result<(), WardenError> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(())
    } else {
        Err(WardenError::Internal(format!(
            "cost amounts must be finite and non-negative, got {amount}"
        )))
    }
}

fn summarize(total: f64, ceiling: f64, breakdown: BTreeMap<String, f64>) -> CostSummary {
    let percent_used = if ceiling > 0.0 {
        total / ceiling * 100.0
    } else {
        0.0
    };
    CostSummary {
        total,
        ceiling,
        percent_used,
        remaining: (ceiling - total).max(0.0),
        breakdown,
    }
}

fn now_iso8601() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sid(s: &str) -> SessionId {
        SessionId(s.to_string())
    }

    fn usage(input: u32, output: u32) -> TokenUsage {
        TokenUsage {
            input_tokens: input,
            output_tokens: output,
        }
    }

    #[tokio::test]
    async fn ensure_session_is_idempotent() {
        let ledger = CostLedger::new();
        let first = ledger.ensure_session(&sid("s1"), Mode::SiteMonkeys).await;
        let second = ledger.ensure_session(&sid("s1"), Mode::TruthGeneral).await;
        assert_eq!(first.mode, Mode::SiteMonkeys);
        assert_eq!(second.mode, Mode::SiteMonkeys);
        assert_eq!(first.created_at, second.created_at);
    }

    #[tokio::test]
    async fn record_accumulates_totals() {
        let ledger = CostLedger::new();
        let id = sid("s1");
        ledger.ensure_session(&id, Mode::BusinessValidation).await;

        let r1 = CostRecord::new(&id, CostSource::Embedding, "text-embedding-3-small", &usage(10, 0), 0.0002);
        let r2 = CostRecord::new(&id, CostSource::Completion, "gpt-4o", &usage(1000, 200), 0.0045);
        assert!((ledger.record(r1).await.unwrap() - 0.0002).abs() < 1e-12);
        assert!((ledger.record(r2).await.unwrap() - 0.0047).abs() < 1e-12);

        assert_eq!(ledger.records(&id).await.len(), 2);
        let summary = ledger.summary(&id, 0.50).await;
        assert!((summary.total - 0.0047).abs() < 1e-12);
        assert!((summary.percent_used - 0.94).abs() < 1e-9);
        assert!((summary.remaining - 0.4953).abs() < 1e-12);
        assert_eq!(summary.breakdown.len(), 2);
        assert!(summary.breakdown.contains_key("completion:gpt-4o"));
    }

    #[tokio::test]
    async fn negative_amounts_are_rejected() {
        let ledger = CostLedger::new();
        let id = sid("s1");
        let bad = CostRecord::new(&id, CostSource::Completion, "gpt-4o", &usage(1, 1), -1.0);
        assert!(ledger.record(bad).await.is_err());
        assert_eq!(ledger.session_total(&id).await, 0.0);
    }

    #[tokio::test]
    async fn unknown_session_summary_is_empty() {
        let ledger = CostLedger::new();
        let summary = ledger.summary(&sid("nobody"), 0.25).await;
        assert_eq!(summary.total, 0.0);
        assert_eq!(summary.remaining, 0.25);
        assert!(ledger.session(&sid("nobody")).await.is_none());
    }

    #[tokio::test]
    async fn reservations_count_against_ceiling() {
        let ledger = CostLedger::new();
        let id = sid("s1");
        let first = ledger.try_reserve(&id, Mode::TruthGeneral, 0.15, 0.25).await;
        assert!(first.reserved_after);
        let second = ledger.try_reserve(&id, Mode::TruthGeneral, 0.15, 0.25).await;
        assert!(!second.reserved_after);
        assert!((second.reserved - 0.15).abs() < 1e-12);

        ledger.release(&id, 0.15).await;
        assert_eq!(ledger.exposure(&id).await, (0.0, 0.0));
    }
}
