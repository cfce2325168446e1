// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider request construction.

use warden_config::model::BackendsConfig;
use warden_context::AssembledContext;
use warden_core::Mode;
use warden_core::types::{ChatMessage, ProviderRequest};

/// System prompt: the mode preamble followed by the rendered context.
pub fn system_prompt(mode: Mode, context: &AssembledContext) -> String {
    let preamble = mode.behavior().system_preamble();
    let rendered = context.render_system_context();
    if rendered.trim().is_empty() {
        preamble.to_string()
    } else {
        format!("{preamble}\n\n{rendered}")
    }
}

/// Build the request sent to the routed backend.
///
/// The model field is left empty; dispatch fills in the chosen backend.
pub fn build_request(
    backends: &BackendsConfig,
    mode: Mode,
    context: &AssembledContext,
    history: &[ChatMessage],
    message: &str,
) -> ProviderRequest {
    let mut messages = Vec::with_capacity(history.len() + 1);
    messages.extend(history.iter().cloned());
    messages.push(ChatMessage::user(message));

    ProviderRequest {
        model: String::new(),
        system_prompt: Some(system_prompt(mode, context)),
        messages,
        max_tokens: backends.max_tokens,
        temperature: backends.temperature,
    }
}
