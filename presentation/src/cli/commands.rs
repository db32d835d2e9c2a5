//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for parley
#[derive(Parser, Debug)]
#[command(name = "parley")]
#[command(author, version, about = "Streaming terminal chat client for OpenAI-compatible APIs")]
#[command(long_about = r#"
Parley is a terminal chat client. Replies stream in as they are generated,
conversations are kept as sessions on disk, and a failed or unwanted reply
can be retried or regenerated.

Without an API endpoint and key configured, parley runs in offline mode and
answers with simulated replies.

Configuration files are loaded from (in priority order):
1. PARLEY_* environment variables (e.g. PARLEY_API__API_KEY)
2. --config <path>     Explicit config file
3. ./parley.toml       Project-level config
4. ~/.config/parley/config.toml   Global config

Example:
  parley                                  Start an interactive chat
  parley "Explain ownership in Rust"      Ask once and exit
  parley --offline                        Chat with simulated replies
"#)]
pub struct Cli {
    /// Ask a single question in the active session and exit
    pub question: Option<String>,

    /// Use simulated replies even when an API is configured
    #[arg(long)]
    pub offline: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress the waiting spinner
    #[arg(short, long)]
    pub quiet: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}
