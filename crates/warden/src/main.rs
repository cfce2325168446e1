// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Warden - truth-first LLM orchestration.
//!
//! This is the binary entry point: a thin CLI over the orchestrator and the
//! drift monitor.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod ask;
mod config_cmd;
mod drift;
mod shutdown;
mod vault_file;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use warden_config::{ConfigError, WardenConfig};
use warden_core::Mode;

use crate::ask::AskOptions;

/// Warden - truth-first LLM orchestration.
#[derive(Parser, Debug)]
#[command(name = "warden", version, about, long_about = None)]
struct Cli {
    /// Configuration file to use instead of the standard search path.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one query through the pipeline.
    Ask {
        /// The query text.
        message: String,
        /// Response mode: truth_general, business_validation or site_monkeys.
        #[arg(long, default_value = "truth_general")]
        mode: Mode,
        /// Session id; a fresh one is generated when omitted.
        #[arg(long)]
        session: Option<String>,
        #[arg(long)]
        user: Option<String>,
        /// File holding authoritative vault text.
        #[arg(long)]
        vault_file: Option<PathBuf>,
        /// Reference documents to include as context.
        #[arg(long = "document")]
        documents: Vec<PathBuf>,
        /// Print the full response and metadata as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Check enforcement configuration against the baseline.
    Drift {
        /// Keep checking every `drift.interval_secs` until interrupted.
        #[arg(long)]
        watch: bool,
        #[arg(long)]
        json: bool,
    },
    /// Inspect configuration.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the effective configuration.
    Show,
    /// Validate configuration and report every problem.
    Validate,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            warden_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.agent.log_level);

    let result = match cli.command {
        Commands::Ask {
            message,
            mode,
            session,
            user,
            vault_file,
            documents,
            json,
        } => {
            let options = AskOptions {
                message,
                mode,
                session,
                user,
                vault_file,
                documents,
                json,
            };
            ask::run_ask(config, options).await
        }
        Commands::Drift { watch, json } => drift::run_drift(config, cli.config, watch, json).await,
        Commands::Config { action: ConfigAction::Show } => {
            config_cmd::render_config(&config).map(|rendered| {
                print!("{rendered}");
                true
            })
        }
        Commands::Config { action: ConfigAction::Validate } => {
            println!("configuration is valid (agent.name={})", config.agent.name);
            Ok(true)
        }
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            eprintln!("warden: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load(path: Option<&std::path::Path>) -> Result<WardenConfig, Vec<ConfigError>> {
    match path {
        Some(path) => warden_config::load_and_validate_path(path),
        None => warden_config::load_and_validate(),
    }
}

/// Logs go to stderr so stdout carries only command output.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warden={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn ask_parses_mode_and_documents() {
        let cli = Cli::try_parse_from([
            "warden",
            "ask",
            "What ROI should we expect?",
            "--mode",
            "business_validation",
            "--document",
            "a.md",
            "--document",
            "b.md",
        ])
        .unwrap();
        match cli.command {
            Commands::Ask { mode, documents, .. } => {
                assert_eq!(mode, Mode::BusinessValidation);
                assert_eq!(documents.len(), 2);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(Cli::try_parse_from(["warden", "ask", "hi", "--mode", "freestyle"]).is_err());
    }

    #[test]
    fn explicit_config_file_is_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("warden.toml");
        std::fs::write(&path, "[agent]\nname = \"test-warden\"\n").unwrap();
        let config = load(Some(&path)).unwrap();
        assert_eq!(config.agent.name, "test-warden");
    }
}
