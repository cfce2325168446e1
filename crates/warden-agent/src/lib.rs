// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request orchestration for Warden.
//!
//! The [`Orchestrator`] runs one query through the whole pipeline:
//! - Recalls memory and resolves vault content
//! - Assembles budgeted context and classifies the query
//! - Scores confidence, routes, and dispatches under the session ceiling
//! - Runs the enforcement chain and validates compliance
//!
//! Any error or panic escaping the pipeline becomes an honest emergency
//! response instead of a crash.

pub mod orchestrator;
pub mod prompt;
pub mod request;

pub use orchestrator::{Orchestrator, OrchestratorBuilder};
pub use request::{ContextReport, FallbackFlags, ProcessRequest, ProcessResponse, ResponseMetadata};
