//! quotesync CLI
//!
//! Command-line interface for quotesync - a local-first quote collection
//! synced with a remote feed.

use std::fs::OpenOptions;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use quotesync_core::{Config, QuoteStore, StorageError, StoreError};

mod commands;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "quotesync")]
#[command(about = "quotesync - Local-first quote collection with remote sync")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a random quote
    Show {
        /// Pick from this category (saved as the selected category)
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Add a quote
    Add {
        /// Quote text
        text: String,
        /// Quote category
        #[arg(short, long)]
        category: String,
    },
    /// List quotes
    #[command(alias = "ls")]
    List {
        /// Filter by category ("all" for every quote)
        #[arg(short, long)]
        category: Option<String>,
    },
    /// List categories with quote counts
    Categories,
    /// Import quotes from a JSON file
    Import {
        /// JSON file containing an array of quotes
        file: PathBuf,
        /// Keep existing quotes and add new ones
        #[arg(long)]
        append: bool,
    },
    /// Export quotes to a JSON file
    Export {
        /// Output file ("-" for stdout)
        file: Option<PathBuf>,
    },
    /// Sync once with the remote feed
    Sync,
    /// Sync periodically until interrupted
    Watch {
        /// Seconds between syncs (defaults to sync_interval_secs)
        #[arg(short, long)]
        interval: Option<u64>,
    },
    /// Show status (data location, remote, counts)
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (see `config show`)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands work on the file only and never open the store
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), cli.config.as_ref(), &output);
    }

    let config = Config::load_with_cli_override(cli.config.as_ref())
        .context("Failed to load configuration")?;
    init_logging(&config, cli.verbose);

    let mut store = QuoteStore::open(&config);

    let result = match cli.command {
        Commands::Show { category } => commands::quote::show(&mut store, category, &output),
        Commands::Add { text, category } => {
            commands::quote::add(store, &config, text, category, &output).await
        }
        Commands::List { category } => commands::quote::list(&mut store, category, &output),
        Commands::Categories => commands::quote::categories(&store, &output),
        Commands::Import { file, append } => {
            commands::transfer::import(&mut store, &config, file, append, &output)
        }
        Commands::Export { file } => commands::transfer::export(&store, file, &output),
        Commands::Sync => commands::sync::sync(store, &config, &output).await,
        Commands::Watch { interval } => {
            commands::sync::watch(store, &config, interval, &output).await
        }
        Commands::Status => commands::status::show(&store, &config, &output),
        Commands::Config { .. } => unreachable!(), // Handled above
    };

    if let Some(hint) = result.as_ref().err().and_then(recovery_hint) {
        eprintln!("hint: {}", hint);
    }

    result
}

/// Recovery suggestion for a failed write anywhere in the error chain
fn recovery_hint(error: &anyhow::Error) -> Option<&'static str> {
    error.chain().find_map(|cause| {
        if let Some(StoreError::Storage(storage)) = cause.downcast_ref::<StoreError>() {
            return storage.recovery_suggestion();
        }
        cause
            .downcast_ref::<StorageError>()
            .and_then(StorageError::recovery_suggestion)
    })
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Initialize logging
///
/// Level comes from QUOTESYNC_LOG, else from the -v count (warn by default).
/// Logs go to config.log_file when set, otherwise to stderr.
fn init_logging(config: &Config, verbose: u8) {
    let log_level = std::env::var("QUOTESYNC_LOG").unwrap_or_else(|_| {
        match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
        .to_string()
    });

    let env_filter = EnvFilter::new(format!(
        "quotesync_core={},quotesync_cli={}",
        log_level, log_level
    ));

    let Some(ref log_path) = config.log_file else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init();
        return;
    };

    let log_file = match OpenOptions::new().create(true).append(true).open(log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not open log file {:?}: {}", log_path, e);
            return;
        }
    };

    // Ignore the error if a subscriber is already installed
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    info!("Logging initialized to {:?}", log_path);
}
