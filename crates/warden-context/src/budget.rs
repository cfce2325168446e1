// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Token estimation and boundary-aware truncation.
//!
//! Tokens are approximated as one per four characters. All lengths here are
//! counted in `char`s, never bytes, so multi-byte text is never split.

/// Appended to every truncated section.
pub const TRUNCATION_MARKER: &str = "\n\n[... truncated to fit context budget]";

const CHARS_PER_TOKEN: usize = 4;

/// Approximate token count: `ceil(chars / 4)`.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(CHARS_PER_TOKEN)
}

/// Result of fitting a text into a token budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Truncated {
    pub text: String,
    pub truncated: bool,
}

/// Fit `text` into `budget_tokens`.
///
/// The cut lands on the latest paragraph break, else sentence break, else
/// word boundary found in the back half of the search window; failing all
/// three it is a hard cut. The window ends at 90% of the character limit and
/// always leaves room for [`TRUNCATION_MARKER`].
pub fn truncate_to_budget(text: &str, budget_tokens: usize) -> Truncated {
    let limit = budget_tokens.saturating_mul(CHARS_PER_TOKEN);
    let char_count = text.chars().count();
    if char_count <= limit {
        return Truncated {
            text: text.to_string(),
            truncated: false,
        };
    }

    let marker_len = TRUNCATION_MARKER.chars().count();
    if limit < marker_len {
        return Truncated {
            text: String::new(),
            truncated: true,
        };
    }

    let window_chars = (limit * 9 / 10).min(limit - marker_len);
    let window = prefix_chars(text, window_chars);
    let floor = window.len() / 2;

    let cut = paragraph_break(window, floor)
        .or_else(|| sentence_break(window, floor))
        .or_else(|| word_break(window, floor))
        .unwrap_or(window.len());

    let mut out = window[..cut].trim_end().to_string();
    out.push_str(TRUNCATION_MARKER);
    Truncated {
        text: out,
        truncated: true,
    }
}

/// The first `n` chars of `text` as a slice.
fn prefix_chars(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn paragraph_break(window: &str, floor: usize) -> Option<usize> {
    window.rfind("\n\n").filter(|&pos| pos > floor)
}

fn sentence_break(window: &str, floor: usize) -> Option<usize> {
    let bytes = window.as_bytes();
    (floor..bytes.len().saturating_sub(1))
        .rev()
        .find(|&i| {
            matches!(bytes[i], b'.' | b'!' | b'?') && matches!(bytes[i + 1], b' ' | b'\n')
        })
        .map(|i| i + 1)
}

fn word_break(window: &str, floor: usize) -> Option<usize> {
    window
        .rfind(char::is_whitespace)
        .filter(|&pos| pos > floor)
}
