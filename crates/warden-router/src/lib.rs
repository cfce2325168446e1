// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Confidence scoring and cost-aware backend routing for Warden.
//!
//! Routing order: score confidence from the semantic analysis and available
//! context, pick the premium or default backend, then dispatch through the
//! admission controller so no call can push a session past its ceiling.

pub mod confidence;
pub mod dispatch;
pub mod router;

pub use confidence::{ConfidenceAdjustment, ConfidenceInputs, ConfidenceScore, compute_confidence};
pub use dispatch::{Completion, Failover, RoutedOutcome};
pub use router::{BackendSet, BackendTier, ModelRouter, RouteReason, RoutingDecision};
