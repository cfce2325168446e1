// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Policy enforcement for generated responses.
//!
//! Six independent stages run in a fixed order over the model's text:
//! truth validation, initiative, political neutrality, product
//! recommendations, founder/business protection and vault compliance. A
//! failing or panicking stage is recorded and skipped; the chain never
//! aborts and never rolls back earlier stages.

pub mod chain;
pub mod metadata;
pub mod stage;
pub mod stages;

pub use chain::{EnforcementChain, EnforcementResult};
pub use metadata::{ComplianceMetadata, ConfidenceAdjustment, Override, StageRecord, StageStatus};
pub use stage::{EnforcementStage, StageContext, StageOutcome};
