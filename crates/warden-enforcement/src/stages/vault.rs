// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault compliance.

use std::collections::BTreeSet;

use warden_config::model::VaultPolicy;
use warden_core::WardenError;

use crate::stage::{EnforcementStage, StageContext, StageOutcome, append_paragraph};

/// Distinct vault terms a response must share to count as drawing on it.
const MIN_SHARED_TERMS: usize = 3;
const MIN_TERM_LEN: usize = 5;

/// Checks that a response reflects the active vault.
///
/// Runs only when vault content is active.
pub struct VaultCompliance {
    policy: VaultPolicy,
}

impl VaultCompliance {
    pub fn new(policy: VaultPolicy) -> Self {
        Self { policy }
    }
}

fn terms(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= MIN_TERM_LEN)
        .map(str::to_lowercase)
        .collect()
}

fn references_vault(text: &str, vault: &str) -> bool {
    if text.to_lowercase().contains("vault") {
        return true;
    }
    let vault_terms = terms(vault);
    if vault_terms.is_empty() {
        return true;
    }
    let needed = MIN_SHARED_TERMS.min(vault_terms.len());
    terms(text).intersection(&vault_terms).count() >= needed
}

impl EnforcementStage for VaultCompliance {
    fn name(&self) -> &'static str {
        "vault_compliance"
    }

    fn applies(&self, ctx: &StageContext<'_>) -> bool {
        ctx.vault_active()
    }

    fn apply(&self, text: &str, ctx: &StageContext<'_>) -> Result<StageOutcome, WardenError> {
        if !self.policy.require_vault_reference {
            return Ok(StageOutcome::pass());
        }
        let vault = ctx.vault.unwrap_or_default();
        if references_vault(text, vault) {
            return Ok(StageOutcome::pass());
        }

        match append_paragraph(text, &self.policy.vault_notice) {
            Some(noted) => Ok(StageOutcome::modified(noted, "response does not reflect the vault")
                .with_confidence(-0.10, "vault not referenced")),
            None => Ok(StageOutcome::pass()),
        }
    }
}
