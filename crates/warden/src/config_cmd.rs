// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `warden config` command implementation.

use warden_config::WardenConfig;
use warden_core::WardenError;

const REDACTED: &str = "<redacted>";

/// Render the effective configuration as TOML with secrets masked.
pub fn render_config(config: &WardenConfig) -> Result<String, WardenError> {
    let mut shown = config.clone();
    if shown.openai.api_key.is_some() {
        shown.openai.api_key = Some(REDACTED.to_string());
    }
    toml::to_string_pretty(&shown)
        .map_err(|e| WardenError::Internal(format!("failed to render configuration: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendered_config_round_trips_through_the_loader() {
        let rendered = render_config(&WardenConfig::default()).unwrap();
        let loaded = warden_config::load_config_from_str(&rendered).unwrap();
        assert_eq!(loaded, WardenConfig::default());
    }

    #[test]
    fn api_key_is_redacted() {
        let mut config = WardenConfig::default();
        config.openai.api_key = Some("sk-live-secret".into());
        let rendered = render_config(&config).unwrap();
        assert!(!rendered.contains("sk-live-secret"));
        assert!(rendered.contains(REDACTED));
    }
}
