// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `warden drift` command implementation.
//!
//! Compares the live enforcement configuration against the compiled
//! baseline, once or periodically until interrupted.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::error;
use warden_config::WardenConfig;
use warden_core::WardenError;
use warden_drift::{DriftMonitor, HealthReport, enforcement_snapshot};

use crate::shutdown;

/// One integrity check of `config` against the baseline.
pub fn check_once(config: &WardenConfig) -> Result<HealthReport, WardenError> {
    let monitor = DriftMonitor::from_defaults(&config.drift)?;
    let live = enforcement_snapshot(&config.enforcement)?;
    Ok(monitor.check(&live))
}

/// Returns whether the configuration is healthy. In watch mode, runs until
/// SIGINT/SIGTERM and always returns `true`.
pub async fn run_drift(
    config: WardenConfig,
    config_path: Option<PathBuf>,
    watch: bool,
    json: bool,
) -> Result<bool, WardenError> {
    if !watch {
        let report = check_once(&config)?;
        print_report(&report, json)?;
        return Ok(report.healthy);
    }

    let monitor = Arc::new(DriftMonitor::from_defaults(&config.drift)?);
    let interval = Duration::from_secs(config.drift.interval_secs.max(1));
    let cancel = shutdown::install_signal_handler();

    let handle = monitor.spawn_periodic(
        move || live_snapshot(config_path.as_deref()),
        interval,
        cancel,
        move |report| {
            error!(
                missing = report.missing_count,
                critical = report.critical_failures.len(),
                "enforcement configuration unhealthy"
            );
            if let Err(e) = print_report(report, json) {
                error!(error = %e, "failed to print drift report");
            }
        },
    );

    handle
        .await
        .map_err(|e| WardenError::Internal(format!("drift monitor task failed: {e}")))?;
    Ok(true)
}

/// Re-read configuration from disk without validation, so emptied settings
/// reach the monitor instead of failing the load.
fn live_snapshot(path: Option<&Path>) -> Result<Value, WardenError> {
    let config = match path {
        Some(path) => warden_config::load_config_from_path(path),
        None => warden_config::load_config(),
    }
    .map_err(|e| WardenError::Config(e.to_string()))?;
    enforcement_snapshot(&config.enforcement)
}

fn print_report(report: &HealthReport, json: bool) -> Result<(), WardenError> {
    if json {
        let rendered = serde_json::to_string_pretty(report)
            .map_err(|e| WardenError::Internal(format!("failed to serialize report: {e}")))?;
        println!("{rendered}");
        return Ok(());
    }

    let status = if report.healthy { "healthy" } else { "UNHEALTHY" };
    println!("enforcement configuration: {status} (checked {})", report.checked_at);
    println!(
        "  drift: {} | missing {} | changed {} | unexpected {}",
        if report.drift_detected { "yes" } else { "no" },
        report.missing_count,
        report.changed_count,
        report.unexpected_count
    );
    for failure in &report.critical_failures {
        println!("  critical: {} is {}", failure.path, failure.reason);
    }
    for path in &report.drift.missing {
        println!("  missing: {path}");
    }
    for change in &report.drift.changed {
        println!("  changed: {} ({} -> {})", change.path, change.expected, change.actual);
    }
    for recommendation in &report.recommendations {
        println!("  recommendation: {recommendation}");
    }
    Ok(())
}
