// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cost tracking, admission control, and pricing for Warden.
//!
//! - [`RateTable`]: per-backend prices from configuration
//! - [`CostLedger`]: in-memory per-session spend with append-only records
//! - [`AdmissionController`]: per-mode ceilings with atomic reservations

pub mod admission;
pub mod ledger;
pub mod pricing;

pub use admission::{Admission, AdmissionCheck, AdmissionController, Reservation};
pub use ledger::{CostLedger, CostRecord, CostSource, CostSummary, SessionInfo};
pub use pricing::RateTable;
