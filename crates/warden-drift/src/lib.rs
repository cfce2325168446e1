// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Drift and integrity monitoring for enforcement configuration.
//!
//! A [`DriftMonitor`] holds an immutable baseline snapshot of the required
//! enforcement settings and compares live snapshots against it by dotted
//! path. Missing or emptied critical settings are immediate failures.

pub mod diff;
pub mod monitor;

pub use diff::{ChangedValue, DriftReport, flatten, lookup};
pub use monitor::{CriticalFailure, DriftMonitor, HealthReport, enforcement_snapshot};
