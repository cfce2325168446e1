// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-stage records and the aggregated compliance metadata.

use serde::{Deserialize, Serialize};
use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StageStatus {
    Passed,
    Modified,
    Skipped,
    /// Returned an error or panicked; the text was left unchanged.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageRecord {
    pub stage: String,
    pub status: StageStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// A stage replaced or amended model output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Override {
    pub module: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceAdjustment {
    pub module: String,
    pub delta: f64,
    pub reason: String,
}

/// Everything the enforcement chain did to one response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceMetadata {
    /// Stages that ran to completion, in execution order.
    pub applied_modules: Vec<String>,
    pub overrides: Vec<Override>,
    pub confidence_adjustments: Vec<ConfidenceAdjustment>,
    pub warnings: Vec<String>,
    /// False when any stage reported a hard violation.
    pub security_pass: bool,
    pub stages: Vec<StageRecord>,
}

impl Default for ComplianceMetadata {
    fn default() -> Self {
        Self {
            applied_modules: Vec::new(),
            overrides: Vec::new(),
            confidence_adjustments: Vec::new(),
            warnings: Vec::new(),
            security_pass: true,
            stages: Vec::new(),
        }
    }
}

impl ComplianceMetadata {
    pub fn confidence_delta(&self) -> f64 {
        self.confidence_adjustments.iter().map(|a| a.delta).sum()
    }

    pub fn status_of(&self, stage: &str) -> Option<StageStatus> {
        self.stages.iter().find(|r| r.stage == stage).map(|r| r.status)
    }
}
