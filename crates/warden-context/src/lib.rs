// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Budgeted context assembly for Warden model prompts.
//!
//! Merges three sources into the system context of a request:
//! - **Vault**: authoritative business rules, consumed from the global
//!   budget first
//! - **Memory**: prior relevant conversation text
//! - **Documents**: caller-supplied documents, sharing one budget
//!
//! Every section is held to its own token budget and to whatever remains of
//! the global cap. Oversized text is cut at the nearest natural boundary and
//! marked as truncated.

pub mod assembler;
pub mod budget;

pub use assembler::{AssembledContext, ContextAssembler, ContextFlag, ContextSources, Document};
pub use budget::{TRUNCATION_MARKER, Truncated, estimate_tokens, truncate_to_budget};
