// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Baseline comparison, health reports and the periodic check task.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use warden_config::model::{DriftConfig, EnforcementConfig};
use warden_core::WardenError;

use crate::diff::{DriftReport, lookup};

/// Serialize enforcement settings into the tree the monitor compares.
pub fn enforcement_snapshot(config: &EnforcementConfig) -> Result<Value, WardenError> {
    serde_json::to_value(config)
        .map_err(|e| WardenError::Internal(format!("failed to snapshot enforcement config: {e}")))
}

/// A critical setting that is absent or empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CriticalFailure {
    pub path: String,
    pub reason: String,
}

/// Outcome of one integrity check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub healthy: bool,
    pub drift_detected: bool,
    pub missing_count: usize,
    pub changed_count: usize,
    pub unexpected_count: usize,
    pub critical_failures: Vec<CriticalFailure>,
    pub recommendations: Vec<String>,
    /// RFC 3339 timestamp.
    pub checked_at: String,
    pub drift: DriftReport,
}

/// Compares live enforcement configuration with an immutable baseline.
#[derive(Debug)]
pub struct DriftMonitor {
    baseline: Value,
    critical_paths: Vec<String>,
}

impl DriftMonitor {
    pub fn new(baseline: Value, critical_paths: Vec<String>) -> Self {
        Self {
            baseline,
            critical_paths,
        }
    }

    /// Baseline from the compiled enforcement defaults.
    pub fn from_defaults(config: &DriftConfig) -> Result<Self, WardenError> {
        Ok(Self::new(
            enforcement_snapshot(&EnforcementConfig::default())?,
            config.critical_paths.clone(),
        ))
    }

    pub fn baseline(&self) -> &Value {
        &self.baseline
    }

    pub fn critical_paths(&self) -> &[String] {
        &self.critical_paths
    }

    pub fn diff(&self, live: &Value) -> DriftReport {
        DriftReport::between(&self.baseline, live)
    }

    /// Critical paths that are absent, null, or empty in `live`.
    pub fn critical_failures(&self, live: &Value) -> Vec<CriticalFailure> {
        self.critical_paths
            .iter()
            .filter_map(|path| {
                let reason = match lookup(live, path) {
                    None => "missing",
                    Some(v) if is_empty(v) => "empty",
                    Some(_) => return None,
                };
                Some(CriticalFailure {
                    path: path.clone(),
                    reason: reason.to_string(),
                })
            })
            .collect()
    }

    pub fn check(&self, live: &Value) -> HealthReport {
        let drift = self.diff(live);
        let critical_failures = self.critical_failures(live);
        let healthy = critical_failures.is_empty() && drift.missing.is_empty();

        let mut recommendations = Vec::new();
        for failure in &critical_failures {
            recommendations.push(format!(
                "Restore `{}` ({}); enforcement cannot be trusted without it.",
                failure.path, failure.reason
            ));
        }
        if !drift.missing.is_empty() {
            recommendations.push(format!(
                "Restore {} missing setting(s): {}.",
                drift.missing.len(),
                drift.missing.join(", ")
            ));
        }
        if !drift.changed.is_empty() {
            recommendations.push(format!(
                "Review {} changed setting(s) against the baseline.",
                drift.changed.len()
            ));
        }
        if !drift.unexpected.is_empty() {
            recommendations.push(format!(
                "Remove or document {} unexpected setting(s).",
                drift.unexpected.len()
            ));
        }

        let report = HealthReport {
            healthy,
            drift_detected: drift.drift_detected,
            missing_count: drift.missing.len(),
            changed_count: drift.changed.len(),
            unexpected_count: drift.unexpected.len(),
            critical_failures,
            recommendations,
            checked_at: chrono::Utc::now().to_rfc3339(),
            drift,
        };

        if !report.healthy {
            error!(
                critical = report.critical_failures.len(),
                missing = report.missing_count,
                "enforcement configuration integrity check failed"
            );
        } else if report.drift_detected {
            warn!(
                changed = report.changed_count,
                unexpected = report.unexpected_count,
                "enforcement configuration drifted from baseline"
            );
        } else {
            debug!("enforcement configuration matches baseline");
        }
        report
    }

    /// Check `source` every `interval` until `cancel` fires.
    ///
    /// `alert` is called with every unhealthy report. A failing source is
    /// logged and retried on the next tick.
    pub fn spawn_periodic<S, A>(
        self: Arc<Self>,
        source: S,
        interval: Duration,
        cancel: CancellationToken,
        alert: A,
    ) -> JoinHandle<()>
    where
        S: Fn() -> Result<Value, WardenError> + Send + 'static,
        A: Fn(&HealthReport) + Send + 'static,
    {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            info!(interval_secs = interval.as_secs(), "drift monitor started");

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        info!("drift monitor shutting down");
                        break;
                    }
                    _ = ticker.tick() => {
                        match source() {
                            Ok(live) => {
                                let report = self.check(&live);
                                if !report.healthy {
                                    alert(&report);
                                }
                            }
                            Err(e) => warn!(error = %e, "drift snapshot unavailable (non-fatal)"),
                        }
                    }
                }
            }
        })
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}
