// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The ordered enforcement chain.

use std::panic::{AssertUnwindSafe, catch_unwind};

use serde::Serialize;
use tracing::{debug, info, warn};
use warden_config::model::EnforcementConfig;
use warden_core::WardenError;

use crate::metadata::{ComplianceMetadata, ConfidenceAdjustment, Override, StageRecord, StageStatus};
use crate::stage::{EnforcementStage, StageContext, StageOutcome};
use crate::stages::{
    FounderProtection, InitiativeEnforcement, PoliticalNeutrality, ProductValidation,
    TruthValidation, VaultCompliance,
};

/// Final text plus what every stage did to it.
#[derive(Debug, Clone, Serialize)]
pub struct EnforcementResult {
    pub text: String,
    pub metadata: ComplianceMetadata,
}

/// Runs stages in insertion order over one response.
pub struct EnforcementChain {
    stages: Vec<Box<dyn EnforcementStage>>,
}

impl EnforcementChain {
    pub fn new(stages: Vec<Box<dyn EnforcementStage>>) -> Self {
        Self { stages }
    }

    /// The six standard stages in their fixed order.
    pub fn from_config(config: &EnforcementConfig) -> Result<Self, WardenError> {
        Ok(Self::new(vec![
            Box::new(TruthValidation::new(config.truth.clone())),
            Box::new(InitiativeEnforcement::new(config.initiative.clone())?),
            Box::new(PoliticalNeutrality::new(config.political.clone())?),
            Box::new(ProductValidation::new(config.product.clone())),
            Box::new(FounderProtection::new(config.founder.clone())),
            Box::new(VaultCompliance::new(config.vault.clone())),
        ]))
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub fn run(&self, text: impl Into<String>, ctx: &StageContext<'_>) -> EnforcementResult {
        let mut text = text.into();
        let mut metadata = ComplianceMetadata::default();

        for stage in &self.stages {
            let name = stage.name();
            if !stage.applies(ctx) {
                debug!(stage = name, "enforcement stage not applicable");
                metadata.stages.push(StageRecord {
                    stage: name.to_string(),
                    status: StageStatus::Skipped,
                    detail: None,
                });
                continue;
            }

            match run_isolated(stage.as_ref(), &text, ctx) {
                Ok(outcome) => {
                    let status = absorb(name, outcome, &mut text, &mut metadata);
                    metadata.applied_modules.push(name.to_string());
                    metadata.stages.push(StageRecord {
                        stage: name.to_string(),
                        status,
                        detail: None,
                    });
                }
                Err(err) => {
                    warn!(stage = name, error = %err, "enforcement stage failed, continuing");
                    metadata.warnings.push(format!("{name}: {err}"));
                    metadata.stages.push(StageRecord {
                        stage: name.to_string(),
                        status: StageStatus::Failed,
                        detail: Some(err.to_string()),
                    });
                }
            }
        }

        info!(
            applied = metadata.applied_modules.len(),
            overrides = metadata.overrides.len(),
            warnings = metadata.warnings.len(),
            security_pass = metadata.security_pass,
            "enforcement chain complete"
        );

        EnforcementResult { text, metadata }
    }
}

/// Run one stage, turning a panic into a stage error.
fn run_isolated(
    stage: &dyn EnforcementStage,
    text: &str,
    ctx: &StageContext<'_>,
) -> Result<StageOutcome, WardenError> {
    match catch_unwind(AssertUnwindSafe(|| stage.apply(text, ctx))) {
        Ok(result) => result.map_err(|err| match err {
            WardenError::Enforcement { .. } => err,
            other => WardenError::Enforcement {
                stage: stage.name().to_string(),
                message: other.to_string(),
            },
        }),
        Err(payload) => Err(WardenError::Enforcement {
            stage: stage.name().to_string(),
            message: format!("panicked: {}", panic_message(payload.as_ref())),
        }),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}

fn absorb(
    name: &str,
    outcome: StageOutcome,
    text: &mut String,
    metadata: &mut ComplianceMetadata,
) -> StageStatus {
    let status = match outcome.text {
        Some(new_text) if new_text != *text => {
            *text = new_text;
            StageStatus::Modified
        }
        _ => StageStatus::Passed,
    };

    metadata
        .overrides
        .extend(outcome.overrides.into_iter().map(|reason| Override {
            module: name.to_string(),
            reason,
        }));
    metadata.confidence_adjustments.extend(
        outcome
            .confidence_adjustments
            .into_iter()
            .map(|(delta, reason)| ConfidenceAdjustment {
                module: name.to_string(),
                delta,
                reason,
            }),
    );
    metadata
        .warnings
        .extend(outcome.warnings.into_iter().map(|w| format!("{name}: {w}")));

    if outcome.hard_violation {
        warn!(stage = name, "hard policy violation");
        metadata.security_pass = false;
    }
    status
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;
    use warden_core::Mode;

    use super::*;
    use crate::stage::test_support::ctx;

    struct Append(&'static str, &'static str);

    impl EnforcementStage for Append {
        fn name(&self) -> &'static str {
            self.0
        }

        fn apply(&self, text: &str, _ctx: &StageContext<'_>) -> Result<StageOutcome, WardenError> {
            Ok(StageOutcome::modified(format!("{text}{}", self.1), "appended"))
        }
    }

    struct Failing;

    impl EnforcementStage for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn apply(&self, _text: &str, _ctx: &StageContext<'_>) -> Result<StageOutcome, WardenError> {
            Err(WardenError::Internal("pattern table missing".into()))
        }
    }

    struct Panicking;

    impl EnforcementStage for Panicking {
        fn name(&self) -> &'static str {
            "panicking"
        }

        fn apply(&self, _text: &str, _ctx: &StageContext<'_>) -> Result<StageOutcome, WardenError> {
            panic!("index out of range")
        }
    }

    struct NeverApplies;

    impl EnforcementStage for NeverApplies {
        fn name(&self) -> &'static str {
            "never"
        }

        fn applies(&self, _ctx: &StageContext<'_>) -> bool {
            false
        }

        fn apply(&self, _text: &str, _ctx: &StageContext<'_>) -> Result<StageOutcome, WardenError> {
            unreachable!()
        }
    }

    #[test]
    fn stages_run_in_insertion_order() {
        let chain = EnforcementChain::new(vec![
            Box::new(Append("a", "-a")),
            Box::new(Append("b", "-b")),
            Box::new(Append("c", "-c")),
        ]);
        let result = chain.run("x", &ctx(Mode::TruthGeneral, 0.9));
        assert_eq!(result.text, "x-a-b-c");
        assert_eq!(result.metadata.applied_modules, vec!["a", "b", "c"]);
        assert_eq!(result.metadata.overrides.len(), 3);
    }

    #[traced_test]
    #[test]
    fn failing_stage_is_isolated() {
        let chain = EnforcementChain::new(vec![
            Box::new(Append("a", "-a")),
            Box::new(Failing),
            Box::new(Append("c", "-c")),
        ]);
        let result = chain.run("x", &ctx(Mode::TruthGeneral, 0.9));

        assert_eq!(result.text, "x-a-c");
        assert_eq!(result.metadata.applied_modules, vec!["a", "c"]);
        assert_eq!(result.metadata.status_of("failing"), Some(StageStatus::Failed));
        assert_eq!(result.metadata.warnings.len(), 1);
        assert!(result.metadata.warnings[0].contains("pattern table missing"));
        assert!(result.metadata.security_pass);
        assert!(logs_contain("enforcement stage failed, continuing"));
    }

    #[test]
    fn panicking_stage_is_isolated() {
        let chain = EnforcementChain::new(vec![
            Box::new(Panicking),
            Box::new(Append("after", "!")),
        ]);
        let result = chain.run("text", &ctx(Mode::TruthGeneral, 0.9));

        assert_eq!(result.text, "text!");
        assert_eq!(result.metadata.status_of("panicking"), Some(StageStatus::Failed));
        assert!(result.metadata.warnings[0].contains("index out of range"));
    }

    #[test]
    fn inapplicable_stage_is_skipped() {
        let chain = EnforcementChain::new(vec![Box::new(NeverApplies), Box::new(Append("a", "."))]);
        let result = chain.run("x", &ctx(Mode::TruthGeneral, 0.9));
        assert_eq!(result.metadata.status_of("never"), Some(StageStatus::Skipped));
        assert_eq!(result.metadata.applied_modules, vec!["a"]);
    }

    #[test]
    fn standard_chain_order() {
        let chain = EnforcementChain::from_config(&EnforcementConfig::default()).unwrap();
        assert_eq!(
            chain.stage_names(),
            vec![
                "truth_validation",
                "initiative_enforcement",
                "political_neutrality",
                "product_validation",
                "founder_protection",
                "vault_compliance",
            ]
        );
    }

    #[test]
    fn vault_stage_skipped_without_vault() {
        let chain = EnforcementChain::from_config(&EnforcementConfig::default()).unwrap();
        let result = chain.run(
            "Raise prices gradually and track churn weekly.",
            &ctx(Mode::BusinessValidation, 0.9),
        );
        assert_eq!(result.metadata.applied_modules.len(), 5);
        assert_eq!(
            result.metadata.status_of("vault_compliance"),
            Some(StageStatus::Skipped)
        );
        assert!(result.metadata.security_pass);
    }

    #[test]
    fn metadata_serializes_snake_case() {
        let chain = EnforcementChain::new(vec![Box::new(Failing)]);
        let result = chain.run("x", &ctx(Mode::TruthGeneral, 0.9));
        let json = serde_json::to_value(&result.metadata).unwrap();
        assert_eq!(json["stages"][0]["status"], "failed");
        assert_eq!(json["security_pass"], true);
    }
}
