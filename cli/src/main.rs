//! CLI entrypoint for MedBot AI
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod commands;

use anyhow::{Result, anyhow, bail};
use clap::Parser;
use colored::Colorize;
use commands::App;
use medbot_application::{KeyValueStore, MedbotGateway};
use medbot_domain::ConfigIssue;
use medbot_infrastructure::{ConfigLoader, FileConfig, FileKeyValueStore, ReqwestMedbotGateway};
use medbot_presentation::{Cli, OutputConfig, ReplConfig};
use std::fs::OpenOptions;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = init_logging(&cli)?;

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(());
    }

    info!("Starting MedBot AI");

    let config = load_config(&cli)?;

    if cli.no_color || !config.output.color {
        colored::control::set_override(false);
    }

    // === Dependency Injection ===
    let gateway: Arc<dyn MedbotGateway> =
        Arc::new(ReqwestMedbotGateway::from_config(&config.server)?);
    let storage_dir = config.storage.resolve_dir();
    info!("Storing client state in {}", storage_dir.display());
    let storage: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::new(storage_dir));

    let output = OutputConfig {
        color: config.output.color && !cli.no_color,
        theme: config.output.theme,
    };
    let repl = ReplConfig {
        show_progress: config.repl.show_progress && !cli.quiet,
        history_file: config.repl.history_file.clone(),
    };

    let app = App::new(gateway, storage, output, repl, config.study.clone(), cli.quiet);
    app.dispatch(cli.command).await
}

/// Initialize logging based on verbosity level.
///
/// Logs go to stderr unless `--log-file` is given, since stdout carries
/// the replies.
fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    match &cli.log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
            Ok(None)
        }
    }
}

/// Load and validate configuration.
///
/// Error-level issues abort startup; warnings are printed and the
/// affected values fall back to their defaults where needed.
fn load_config(cli: &Cli) -> Result<FileConfig> {
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {e}"))?
    };

    let issues = config.validate();
    let (errors, warnings): (Vec<ConfigIssue>, Vec<ConfigIssue>) =
        issues.into_iter().partition(ConfigIssue::is_error);

    for issue in &warnings {
        warn!("Config: {}", issue.message);
        eprintln!("{} {}", "Config warning:".yellow(), issue.message);
    }
    if !errors.is_empty() {
        let messages: Vec<&str> = errors.iter().map(|i| i.message.as_str()).collect();
        bail!("Invalid configuration:\n  {}", messages.join("\n  "));
    }

    Ok(config)
}
