//! CLI entrypoint for parley
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use parley_application::{CompletionGateway, ResponseOrchestrator, SessionStore};
use parley_domain::TurnOutcome;
use parley_infrastructure::{
    ConfigLoader, FileConfig, FileKeyValueStore, OfflineGateway, OpenAiCompatibleClient,
    SessionGateway,
};
use parley_presentation::{ChatRepl, Cli, ReplConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = init_logging(&cli)?;

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(());
    }

    info!("Starting parley");

    let config = load_config(&cli)?;

    // === Dependency Injection ===
    let (gateway, backend) = build_gateway(&cli, &config)?;

    let data_dir = config.storage.resolved_data_dir();
    info!("Session data directory: {}", data_dir.display());
    let persistence = Arc::new(SessionGateway::new(Arc::new(FileKeyValueStore::new(data_dir))));
    let store = SessionStore::load(persistence, config.store_config()).await;

    let orchestrator = Arc::new(
        ResponseOrchestrator::new(store.clone(), gateway)
            .with_config(config.chat.to_orchestrator_config()),
    );

    let repl_config = ReplConfig::default()
        .with_spinner(config.chat.show_spinner && !cli.quiet)
        .with_history_file(config.chat.history_file.as_ref().map(PathBuf::from));
    let repl = ChatRepl::new(orchestrator, backend).with_config(repl_config);

    // Single question mode
    if let Some(question) = cli.question.as_deref() {
        let outcome = repl.ask(question).await;
        store.flush().await;
        return match outcome? {
            TurnOutcome::Failed(info) => bail!("Reply failed: {}", info.message),
            TurnOutcome::Completed(_) | TurnOutcome::Cancelled => Ok(()),
        };
    }

    let result = repl.run().await;
    store.flush().await;
    result?;

    Ok(())
}

/// Install the tracing subscriber. The returned guard keeps the file
/// writer alive and must be held until exit.
fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let Some(path) = &cli.log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    let file_name = path
        .file_name()
        .with_context(|| format!("Invalid log file path: {}", path.display()))?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| std::path::Path::new("."));
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Could not create log directory {}", dir.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .init();
    Ok(Some(guard))
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    let config = if cli.no_config {
        ConfigLoader::load_env_only()
    } else {
        ConfigLoader::load(cli.config.as_deref())
    }
    .map_err(|e| anyhow::anyhow!(e))
    .context("Failed to load configuration")?;

    let issues = config.validate();
    if !issues.is_empty() {
        for issue in &issues {
            eprintln!("config error: {}", issue);
        }
        bail!("Invalid configuration ({} problem(s))", issues.len());
    }
    Ok(config)
}

/// Real endpoint when configured, simulated replies otherwise
fn build_gateway(cli: &Cli, config: &FileConfig) -> Result<(Arc<dyn CompletionGateway>, String)> {
    let openai = if cli.offline { None } else { config.openai_config() };

    match openai {
        Some(openai) => {
            let backend = format!("{} at {}", openai.model, openai.base_url);
            let client = OpenAiCompatibleClient::new(openai)?;
            Ok((Arc::new(client), backend))
        }
        None => {
            if !cli.offline && config.api.use_real_api {
                warn!("No API endpoint or key configured; using offline replies");
            }
            let gateway = OfflineGateway::new(config.offline.to_policy());
            Ok((Arc::new(gateway), "offline (simulated replies)".to_string()))
        }
    }
}
