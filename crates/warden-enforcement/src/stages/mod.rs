// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The six standard enforcement stages.

mod founder;
mod initiative;
mod political;
mod product;
mod truth;
mod vault;

pub use founder::FounderProtection;
pub use initiative::InitiativeEnforcement;
pub use political::PoliticalNeutrality;
pub use product::ProductValidation;
pub use truth::TruthValidation;
pub use vault::VaultCompliance;
