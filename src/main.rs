//! Binary entry point for feedsift.
//!
//! This binary provides the CLI interface for the feedsift collector.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use clap::{Parser, Subcommand};
use feedsift::config::FeedsiftConfig;
use feedsift::observability;
use feedsift::services::CollectorService;
use feedsift::services::deduplication::DeduplicationService;
use feedsift::storage::SqliteRecordStore;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// Feedsift - forum post collector with two-tier deduplication.
#[derive(Parser)]
#[command(name = "feedsift")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Run one collection cycle.
    Run {
        /// CSV output path.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Directory of `<channel>.jsonl` source files.
        #[arg(long, conflicts_with = "sample")]
        source_dir: Option<PathBuf>,

        /// Use the built-in sample posts instead of a source directory.
        #[arg(long)]
        sample: bool,

        /// Skip sentiment scoring; every row is neutral.
        #[arg(long)]
        no_sentiment: bool,
    },

    /// Print deduplication statistics as JSON.
    Stats,

    /// Rebuild the membership filter from the database.
    RebuildFilter,

    /// Check whether content has been seen before.
    Check {
        /// Post title.
        #[arg(long)]
        title: String,

        /// Post body.
        #[arg(long, default_value = "")]
        body: String,
    },

    /// Manage configuration.
    Config {
        /// Print the effective configuration as JSON.
        #[arg(long)]
        show: bool,
    },
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = match FeedsiftConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    let mut observability =
        match observability::init_from_settings(&config.observability, cli.verbose) {
            Ok(handle) => handle,
            Err(e) => {
                eprintln!("Failed to initialize observability: {e}");
                return ExitCode::FAILURE;
            },
        };

    let result = run_command(cli.command, config);
    observability.shutdown();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
fn run_command(command: Commands, config: FeedsiftConfig) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Run {
            output,
            source_dir,
            sample,
            no_sentiment,
        } => cmd_run(config, output, source_dir, sample, no_sentiment),
        Commands::Stats => cmd_stats(&config),
        Commands::RebuildFilter => cmd_rebuild_filter(&config),
        Commands::Check { title, body } => cmd_check(&config, &title, &body),
        Commands::Config { show } => cmd_config(&config, show),
    }
}

fn open_dedup(config: &FeedsiftConfig) -> feedsift::Result<DeduplicationService> {
    let store = Arc::new(SqliteRecordStore::open(&config.db_path)?);
    DeduplicationService::open(store, config.dedup.clone())
}

fn cmd_run(
    mut config: FeedsiftConfig,
    output: Option<PathBuf>,
    source_dir: Option<PathBuf>,
    sample: bool,
    no_sentiment: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(output) = output {
        config.output_path = output;
    }
    if let Some(dir) = source_dir {
        config.source_dir = Some(dir);
    }
    if sample {
        config.source_dir = None;
    }
    if no_sentiment {
        config.sentiment_enabled = false;
    }

    let collector = CollectorService::from_config(&config)?;
    let summary = collector.run_once()?;

    match &summary.output_path {
        Some(path) => println!(
            "Run {}: fetched {}, kept {}, dropped {} duplicates -> {}",
            summary.run_id,
            summary.fetched,
            summary.survivors,
            summary.duplicates_removed,
            path.display()
        ),
        None => println!(
            "Run {}: fetched {}, dropped {} duplicates, nothing new to write",
            summary.run_id, summary.fetched, summary.duplicates_removed
        ),
    }
    if !summary.failed_channels.is_empty() {
        println!("Failed channels: {}", summary.failed_channels.join(", "));
    }
    Ok(())
}

fn cmd_stats(config: &FeedsiftConfig) -> Result<(), Box<dyn std::error::Error>> {
    let stats = open_dedup(config)?.stats()?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

fn cmd_rebuild_filter(config: &FeedsiftConfig) -> Result<(), Box<dyn std::error::Error>> {
    let count = open_dedup(config)?.rebuild_filter()?;
    println!("Membership filter rebuilt from {count} stored fingerprints");
    Ok(())
}

fn cmd_check(config: &FeedsiftConfig, title: &str, body: &str) -> Result<(), Box<dyn std::error::Error>> {
    let dedup = open_dedup(config)?;
    let fingerprint = feedsift::services::deduplication::ContentHasher::fingerprint(title, body);
    if dedup.is_known(title, body) {
        println!("duplicate {fingerprint}");
    } else {
        println!("new {fingerprint}");
    }
    Ok(())
}

fn cmd_config(config: &FeedsiftConfig, show: bool) -> Result<(), Box<dyn std::error::Error>> {
    if show {
        println!("{}", serde_json::to_string_pretty(config)?);
    } else {
        match feedsift::config::default_config_path() {
            Some(path) => println!("Config file: {}", path.display()),
            None => println!("No platform config directory available"),
        }
        println!("Use --show to print the effective configuration");
    }
    Ok(())
}
