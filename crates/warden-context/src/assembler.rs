// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Context assembly under per-source and global token budgets.

use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::{debug, warn};
use warden_config::model::ContextConfig;
use warden_core::Mode;

use crate::budget::{estimate_tokens, truncate_to_budget};

/// Something notable that happened while fitting sources into budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ContextFlag {
    MemoryTruncated,
    DocumentsTruncated,
    /// At least one document was dropped because the budget ran out.
    DocumentsOmitted,
    /// Documents were dropped because the mode treats the vault as exclusive.
    DocumentsSuppressed,
    VaultTruncated,
}

/// A caller-supplied document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub name: String,
    pub text: String,
}

impl Document {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Raw inputs for one request's context.
#[derive(Debug, Clone, Default)]
pub struct ContextSources {
    pub memory: Option<String>,
    pub documents: Vec<Document>,
    pub vault: Option<String>,
}

/// Budgeted context for one request. Built fresh per request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssembledContext {
    pub memory: Option<String>,
    /// Documents that fit, in input order, possibly truncated.
    pub documents: Vec<Document>,
    pub vault: Option<String>,
    pub memory_tokens: usize,
    pub document_tokens: usize,
    pub vault_tokens: usize,
    /// Names of documents skipped for lack of budget or suppression.
    pub omitted_documents: Vec<String>,
    pub flags: Vec<ContextFlag>,
}

impl AssembledContext {
    pub fn total_tokens(&self) -> usize {
        self.memory_tokens + self.document_tokens + self.vault_tokens
    }

    pub fn has_memory(&self) -> bool {
        self.memory.is_some()
    }

    pub fn has_documents(&self) -> bool {
        !self.documents.is_empty()
    }

    pub fn has_vault(&self) -> bool {
        self.vault.is_some()
    }

    pub fn has_flag(&self, flag: ContextFlag) -> bool {
        self.flags.contains(&flag)
    }

    /// Render every present section into one labelled block.
    ///
    /// Vault comes first since it is authoritative. Returns an empty string
    /// when no source is present.
    pub fn render_system_context(&self) -> String {
        let mut sections = Vec::new();
        if let Some(vault) = &self.vault {
            sections.push(format!("## VAULT (authoritative business rules)\n{vault}"));
        }
        if let Some(memory) = &self.memory {
            sections.push(format!("## MEMORY (prior relevant context)\n{memory}"));
        }
        for doc in &self.documents {
            sections.push(format!("## DOCUMENT: {}\n{}", doc.name, doc.text));
        }
        sections.join("\n\n")
    }

    fn flag(&mut self, flag: ContextFlag) {
        if !self.flags.contains(&flag) {
            self.flags.push(flag);
        }
    }
}

/// Fits memory, documents and vault text into the configured budgets.
#[derive(Debug, Clone)]
pub struct ContextAssembler {
    config: ContextConfig,
}

impl ContextAssembler {
    pub fn new(config: ContextConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// Assemble the request context.
    ///
    /// The global budget is consumed vault first, then memory, then
    /// documents. Each section is capped by the smaller of its own budget and
    /// whatever global budget remains.
    pub fn assemble(&self, sources: &ContextSources, mode: Mode) -> AssembledContext {
        let mut ctx = AssembledContext::default();
        let mut remaining = self.config.total_budget;

        if let Some(vault) = non_blank(sources.vault.as_deref()) {
            let budget = self.config.vault_budget.min(remaining);
            let out = truncate_to_budget(vault, budget);
            if out.truncated {
                warn!(
                    original_tokens = estimate_tokens(vault),
                    budget, "vault content truncated"
                );
                ctx.flag(ContextFlag::VaultTruncated);
            }
            if !out.text.is_empty() {
                ctx.vault_tokens = estimate_tokens(&out.text);
                remaining -= ctx.vault_tokens;
                ctx.vault = Some(out.text);
            }
        }

        if let Some(memory) = non_blank(sources.memory.as_deref()) {
            let budget = self.config.memory_budget.min(remaining);
            let out = truncate_to_budget(memory, budget);
            if out.truncated {
                ctx.flag(ContextFlag::MemoryTruncated);
            }
            if !out.text.is_empty() {
                ctx.memory_tokens = estimate_tokens(&out.text);
                remaining -= ctx.memory_tokens;
                ctx.memory = Some(out.text);
            }
        }

        let documents: Vec<&Document> = sources
            .documents
            .iter()
            .filter(|d| !d.text.trim().is_empty())
            .collect();

        if mode.behavior().vault_exclusive() && ctx.has_vault() && !documents.is_empty() {
            debug!(
                count = documents.len(),
                %mode,
                "documents suppressed by exclusive vault"
            );
            ctx.flag(ContextFlag::DocumentsSuppressed);
            ctx.omitted_documents = documents.iter().map(|d| d.name.clone()).collect();
            return ctx;
        }

        let mut doc_budget = self.config.document_budget.min(remaining);
        for doc in documents {
            if doc_budget == 0 {
                ctx.flag(ContextFlag::DocumentsOmitted);
                ctx.omitted_documents.push(doc.name.clone());
                continue;
            }
            let out = truncate_to_budget(&doc.text, doc_budget);
            if out.text.is_empty() {
                ctx.flag(ContextFlag::DocumentsOmitted);
                ctx.omitted_documents.push(doc.name.clone());
                doc_budget = 0;
                continue;
            }
            if out.truncated {
                ctx.flag(ContextFlag::DocumentsTruncated);
            }
            let tokens = estimate_tokens(&out.text);
            doc_budget -= tokens;
            ctx.document_tokens += tokens;
            ctx.documents.push(Document::new(doc.name.clone(), out.text));
        }

        debug!(
            vault_tokens = ctx.vault_tokens,
            memory_tokens = ctx.memory_tokens,
            document_tokens = ctx.document_tokens,
            flags = ?ctx.flags,
            "context assembled"
        );
        ctx
    }
}

fn non_blank(text: Option<&str>) -> Option<&str> {
    text.filter(|t| !t.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::budget::TRUNCATION_MARKER;

    fn assembler(memory: usize, document: usize, vault: usize, total: usize) -> ContextAssembler {
        ContextAssembler::new(ContextConfig {
            memory_budget: memory,
            document_budget: document,
            vault_budget: vault,
            total_budget: total,
        })
    }

    #[test]
    fn empty_sources_render_nothing() {
        let ctx = ContextAssembler::new(ContextConfig::default())
            .assemble(&ContextSources::default(), Mode::TruthGeneral);
        assert_eq!(ctx.total_tokens(), 0);
        assert!(ctx.flags.is_empty());
        assert!(ctx.render_system_context().is_empty());
    }

    #[test]
    fn small_sources_pass_through() {
        let sources = ContextSources {
            memory: Some("User runs a landscaping business.".into()),
            documents: vec![Document::new("plan.txt", "Quarterly plan text.")],
            vault: None,
        };
        let ctx = ContextAssembler::new(ContextConfig::default())
            .assemble(&sources, Mode::BusinessValidation);
        assert!(ctx.flags.is_empty());
        assert_eq!(ctx.memory.as_deref(), Some("User runs a landscaping business."));
        assert_eq!(ctx.documents.len(), 1);
        let rendered = ctx.render_system_context();
        assert!(rendered.contains("## MEMORY"));
        assert!(rendered.contains("## DOCUMENT: plan.txt"));
    }

    #[test]
    fn large_vault_is_truncated_within_budget() {
        let sources = ContextSources {
            vault: Some("Vault rule. ".repeat(5000)),
            ..Default::default()
        };
        let ctx = ContextAssembler::new(ContextConfig::default())
            .assemble(&sources, Mode::SiteMonkeys);
        assert!(ctx.has_flag(ContextFlag::VaultTruncated));
        let vault = ctx.vault.unwrap();
        assert!(vault.chars().count() <= 9000 * 4);
        assert!(vault.ends_with(TRUNCATION_MARKER));
        assert!(ctx.vault_tokens <= 9000);
    }

    #[test]
    fn exclusive_vault_suppresses_documents() {
        let sources = ContextSources {
            memory: None,
            documents: vec![Document::new("a.txt", "doc a"), Document::new("b.txt", "doc b")],
            vault: Some("Minimum price is $697.".into()),
        };
        let ctx = ContextAssembler::new(ContextConfig::default())
            .assemble(&sources, Mode::SiteMonkeys);
        assert!(ctx.has_flag(ContextFlag::DocumentsSuppressed));
        assert!(ctx.documents.is_empty());
        assert_eq!(ctx.omitted_documents, vec!["a.txt", "b.txt"]);
        assert_eq!(ctx.document_tokens, 0);
    }

    #[test]
    fn non_exclusive_mode_keeps_documents_alongside_vault() {
        let sources = ContextSources {
            memory: None,
            documents: vec![Document::new("a.txt", "doc a")],
            vault: Some("Vault text.".into()),
        };
        let ctx = ContextAssembler::new(ContextConfig::default())
            .assemble(&sources, Mode::BusinessValidation);
        assert!(!ctx.has_flag(ContextFlag::DocumentsSuppressed));
        assert_eq!(ctx.documents.len(), 1);
    }

    #[test]
    fn documents_share_one_budget() {
        let sources = ContextSources {
            documents: vec![
                Document::new("first.txt", "x".repeat(400)),
                Document::new("second.txt", "y".repeat(400)),
                Document::new("third.txt", "z".repeat(400)),
            ],
            ..Default::default()
        };
        let ctx = assembler(100, 150, 100, 1000).assemble(&sources, Mode::TruthGeneral);
        assert_eq!(ctx.documents[0].name, "first.txt");
        assert_eq!(ctx.documents[0].text.len(), 400);
        assert!(ctx.document_tokens <= 150);
        assert!(ctx.has_flag(ContextFlag::DocumentsTruncated));
        assert!(ctx.has_flag(ContextFlag::DocumentsOmitted));
        assert!(ctx.omitted_documents.contains(&"third.txt".to_string()));
    }

    #[test]
    fn global_budget_is_consumed_vault_first() {
        let sources = ContextSources {
            memory: Some("m".repeat(2000)),
            documents: vec![Document::new("d.txt", "d".repeat(2000))],
            vault: Some("v".repeat(1600)),
        };
        // 400 tokens of vault exhaust the 400-token global cap.
        let ctx = assembler(1000, 1000, 1000, 400).assemble(&sources, Mode::BusinessValidation);
        assert_eq!(ctx.vault_tokens, 400);
        assert!(ctx.memory.is_none());
        assert!(ctx.has_flag(ContextFlag::MemoryTruncated));
        assert!(ctx.documents.is_empty());
        assert!(ctx.has_flag(ContextFlag::DocumentsOmitted));
        assert!(ctx.total_tokens() <= 400);
    }

    #[test]
    fn blank_sources_are_ignored() {
        let sources = ContextSources {
            memory: Some("   ".into()),
            documents: vec![Document::new("blank.txt", "\n\n")],
            vault: Some(String::new()),
        };
        let ctx = ContextAssembler::new(ContextConfig::default())
            .assemble(&sources, Mode::SiteMonkeys);
        assert!(!ctx.has_memory());
        assert!(!ctx.has_documents());
        assert!(!ctx.has_vault());
        assert!(ctx.flags.is_empty());
    }

    proptest! {
        #[test]
        fn sections_respect_budgets(
            memory in "[a-z .\n]{0,3000}",
            doc in "[a-z .\n]{0,3000}",
            vault in "[a-z .\n]{0,3000}",
            budgets in (1usize..400, 1usize..400, 1usize..400, 1usize..900),
        ) {
            let (m, d, v, total) = budgets;
            let sources = ContextSources {
                memory: Some(memory),
                documents: vec![Document::new("d", doc)],
                vault: Some(vault),
            };
            let ctx = assembler(m, d, v, total).assemble(&sources, Mode::TruthGeneral);
            prop_assert!(ctx.memory_tokens <= m);
            prop_assert!(ctx.document_tokens <= d);
            prop_assert!(ctx.vault_tokens <= v);
            prop_assert!(ctx.total_tokens() <= total);
        }
    }
}
