// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Response modes and the per-mode behaviour table.
//!
//! Each [`Mode`] resolves to a static [`ModeBehavior`] implementation. Pipeline
//! stages ask the behaviour object instead of branching on mode names.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The response mode requested by the caller.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Mode {
    /// General truth-first answers.
    #[default]
    TruthGeneral,
    /// Business validation with deeper numeric analysis.
    BusinessValidation,
    /// Site Monkeys operations; vault content is authoritative.
    SiteMonkeys,
}

impl Mode {
    /// All modes, lowest cost tier first.
    pub const ALL: [Mode; 3] = [Mode::TruthGeneral, Mode::BusinessValidation, Mode::SiteMonkeys];

    /// Resolve this mode to its behaviour object.
    pub fn behavior(self) -> &'static dyn ModeBehavior {
        match self {
            Mode::TruthGeneral => &TruthGeneral,
            Mode::BusinessValidation => &BusinessValidation,
            Mode::SiteMonkeys => &SiteMonkeys,
        }
    }
}

/// Capabilities that differ between modes.
pub trait ModeBehavior: Send + Sync {
    /// The mode this behaviour belongs to.
    fn mode(&self) -> Mode;

    /// When true and vault content is present, document content is suppressed.
    fn vault_exclusive(&self) -> bool {
        false
    }

    /// When true, high-complexity queries are escalated to the premium backend.
    fn deep_analysis(&self) -> bool {
        false
    }

    /// Short system preamble placed ahead of assembled context.
    fn system_preamble(&self) -> &'static str;
}

struct TruthGeneral;
struct BusinessValidation;
struct SiteMonkeys;

impl ModeBehavior for TruthGeneral {
    fn mode(&self) -> Mode {
        Mode::TruthGeneral
    }

    fn system_preamble(&self) -> &'static str {
        "Answer truthfully. State uncertainty plainly and never present a guess as a fact."
    }
}

impl ModeBehavior for BusinessValidation {
    fn mode(&self) -> Mode {
        Mode::BusinessValidation
    }

    fn deep_analysis(&self) -> bool {
        true
    }

    fn system_preamble(&self) -> &'static str {
        "Validate business decisions. Show the numbers, name the risks, and flag anything \
         that threatens cash flow or margins."
    }
}

impl ModeBehavior for SiteMonkeys {
    fn mode(&self) -> Mode {
        Mode::SiteMonkeys
    }

    fn vault_exclusive(&self) -> bool {
        true
    }

    fn deep_analysis(&self) -> bool {
        true
    }

    fn system_preamble(&self) -> &'static str {
        "Operate under the Site Monkeys vault. Vault rules override general knowledge; \
         cite the vault when it applies."
    }
}
