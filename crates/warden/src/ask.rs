// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `warden ask` command implementation.
//!
//! Runs one query through the full pipeline against the configured
//! OpenAI-compatible endpoint and prints the enforced response.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;
use warden_agent::{Orchestrator, ProcessRequest, ProcessResponse};
use warden_config::WardenConfig;
use warden_context::Document;
use warden_core::{Mode, WardenError};
use warden_openai::OpenAiAdapter;

use crate::shutdown;
use crate::vault_file::FileVault;

#[derive(Debug, Clone)]
pub struct AskOptions {
    pub message: String,
    pub mode: Mode,
    pub session: Option<String>,
    pub user: Option<String>,
    pub vault_file: Option<PathBuf>,
    pub documents: Vec<PathBuf>,
    pub json: bool,
}

/// Returns whether a model answered. Emergency and backend-unavailable
/// responses return `false`.
pub async fn run_ask(config: WardenConfig, options: AskOptions) -> Result<bool, WardenError> {
    let adapter = Arc::new(OpenAiAdapter::new(&config)?);
    let mut builder = Orchestrator::builder(config)
        .provider(adapter.clone())
        .embedder(adapter)
        .cancel(shutdown::install_signal_handler());
    if let Some(path) = &options.vault_file {
        builder = builder.vault(Arc::new(FileVault::new(path)));
    }
    let orchestrator = builder.build().await?;

    let request = build_request(&options).await?;
    info!(session_id = request.session_id.as_str(), mode = %request.mode, "processing query");
    let response = orchestrator.process(request).await;

    print_response(&response, options.json)?;
    Ok(response.success && !response.metadata.fallback.backend_unavailable)
}

async fn build_request(options: &AskOptions) -> Result<ProcessRequest, WardenError> {
    let session = options
        .session
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let mut request = ProcessRequest::new(options.message.clone(), session, options.mode);
    if let Some(user) = &options.user {
        request = request.with_user(user.clone());
    }
    for path in &options.documents {
        request = request.with_document(read_document(path).await?);
    }
    Ok(request)
}

async fn read_document(path: &Path) -> Result<Document, WardenError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| WardenError::Internal(format!("failed to read document {}: {e}", path.display())))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(Document::new(name, text))
}

fn print_response(response: &ProcessResponse, json: bool) -> Result<(), WardenError> {
    if json {
        let rendered = serde_json::to_string_pretty(response)
            .map_err(|e| WardenError::Internal(format!("failed to serialize response: {e}")))?;
        println!("{rendered}");
        return Ok(());
    }

    println!("{}", response.response_text);

    let meta = &response.metadata;
    let confidence = meta
        .final_confidence
        .map(|c| format!("{c:.2}"))
        .unwrap_or_else(|| "-".into());
    let spent = meta
        .cost
        .as_ref()
        .map(|c| format!("${:.4} of ${:.2}", c.total, c.ceiling))
        .unwrap_or_else(|| "-".into());
    eprintln!(
        "\n[{} | backend {} | confidence {} | spent {}]",
        meta.mode,
        meta.backend.as_deref().unwrap_or("none"),
        confidence,
        spent
    );
    for warning in &meta.warnings {
        eprintln!("warning: {warning}");
    }
    Ok(())
}
