// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request and response types for [`Orchestrator::process`](crate::Orchestrator::process).

use serde::{Deserialize, Serialize};
use warden_context::{ContextFlag, Document};
use warden_core::Mode;
use warden_core::types::ChatMessage;
use warden_cost::CostSummary;
use warden_enforcement::ComplianceMetadata;
use warden_router::{ConfidenceScore, RoutingDecision};
use warden_semantic::SemanticAnalysis;

/// One user query plus everything the caller knows about it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRequest {
    pub message: String,
    pub session_id: String,
    pub user_id: String,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default)]
    pub conversation_history: Vec<ChatMessage>,
    #[serde(default)]
    pub document_context: Vec<Document>,
    /// Vault text supplied by the caller; wins over the vault adapter.
    #[serde(default)]
    pub vault_context: Option<String>,
}

impl ProcessRequest {
    pub fn new(message: impl Into<String>, session_id: impl Into<String>, mode: Mode) -> Self {
        Self {
            message: message.into(),
            session_id: session_id.into(),
            user_id: "anonymous".to_string(),
            mode,
            conversation_history: Vec::new(),
            document_context: Vec::new(),
            vault_context: None,
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    pub fn with_history(mut self, history: Vec<ChatMessage>) -> Self {
        self.conversation_history = history;
        self
    }

    pub fn with_document(mut self, document: Document) -> Self {
        self.document_context.push(document);
        self
    }

    pub fn with_vault(mut self, vault: impl Into<String>) -> Self {
        self.vault_context = Some(vault.into());
        self
    }
}

/// Which degraded paths a response went through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackFlags {
    /// Classification used the regex-only path.
    pub classification_fallback: bool,
    /// Reference embeddings were unavailable at startup.
    pub classifier_degraded: bool,
    /// The session ceiling blocked the model call.
    pub admission_denied: bool,
    /// The premium backend failed and the default answered.
    pub backend_failover: bool,
    /// No backend could answer; the response says so instead of guessing.
    pub backend_unavailable: bool,
    /// The pipeline failed and an emergency response was returned.
    pub emergency: bool,
}

/// Token accounting for the assembled context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextReport {
    pub memory_tokens: usize,
    pub document_tokens: usize,
    pub vault_tokens: usize,
    pub total_tokens: usize,
    pub has_memory: bool,
    pub has_documents: bool,
    pub has_vault: bool,
    pub omitted_documents: Vec<String>,
    pub flags: Vec<ContextFlag>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResponseMetadata {
    pub session_id: String,
    pub mode: Mode,
    pub context: Option<ContextReport>,
    pub analysis: Option<SemanticAnalysis>,
    pub confidence: Option<ConfidenceScore>,
    /// Confidence after enforcement adjustments.
    pub final_confidence: Option<f64>,
    pub routing: Option<RoutingDecision>,
    /// Backend that produced the text, after any failover.
    pub backend: Option<String>,
    pub cost: Option<CostSummary>,
    pub compliance: Option<ComplianceMetadata>,
    pub fallback: FallbackFlags,
    pub warnings: Vec<String>,
    pub error: Option<String>,
    pub processing_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessResponse {
    pub success: bool,
    pub response_text: String,
    pub metadata: ResponseMetadata,
}
