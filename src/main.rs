//! Binary entry point for revprune.
//!
//! This binary provides the CLI interface for policy-driven revision pruning.

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

mod commands;

use clap::{Parser, Subcommand};
use commands::OutputFormat;
use revprune::config::PruneConfig;
use revprune::observability::{self, LoggingConfig};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Revprune - delete old content revisions under per-type retention policies.
#[derive(Parser)]
#[command(name = "revprune")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true, env = "REVPRUNE_CONFIG_PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Show tracked content types with candidate and deletable counts.
    Status,

    /// Delete surplus revisions.
    Run {
        /// Show what would be deleted without making changes.
        #[arg(long)]
        dry_run: bool,

        /// Override the configured per-run quota.
        #[arg(short, long)]
        quota: Option<u64>,

        /// Output format.
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// List candidate entities or deletable revisions for a content type.
    Inspect {
        /// The content type.
        content_type: String,

        /// List deletable revisions instead of candidate entities.
        #[arg(long)]
        revisions: bool,

        /// Maximum number of deletable revisions to list.
        #[arg(short, long)]
        limit: Option<u64>,
    },

    /// Stop tracking a content type.
    Untrack {
        /// The content type.
        content_type: String,

        /// Apply without asking for confirmation.
        #[arg(long)]
        force: bool,
    },

    /// Show the resolved configuration.
    Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let (config, config_path) = match load_config(cli.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    let logging = LoggingConfig::from_settings(Some(&config.logging), cli.verbose);
    if let Err(e) = observability::init(logging) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli.command, config, config_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
fn run_command(
    command: Commands,
    config: PruneConfig,
    config_path: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Status => commands::cmd_status(&config),

        Commands::Run {
            dry_run,
            quota,
            format,
        } => commands::cmd_run(&config, dry_run, quota, format),

        Commands::Inspect {
            content_type,
            revisions,
            limit,
        } => commands::cmd_inspect(&config, &content_type, revisions, limit),

        Commands::Untrack {
            content_type,
            force,
        } => commands::cmd_untrack(config, config_path.as_deref(), &content_type, force),

        Commands::Config => commands::cmd_config(&config, config_path.as_deref()),
    }
}

/// Loads configuration and returns it with the path it belongs to.
///
/// `--config` (or `REVPRUNE_CONFIG_PATH`, via clap) must point at a readable
/// file; otherwise the default location is tried and defaults are used.
fn load_config(
    path: Option<&Path>,
) -> Result<(PruneConfig, Option<PathBuf>), Box<dyn std::error::Error>> {
    // If a path is provided, load from that file
    if let Some(config_path) = path {
        let config = PruneConfig::load_from_file(config_path)?;
        return Ok((config, Some(config_path.to_path_buf())));
    }

    // Otherwise, load from default location
    Ok(load_default_config(PruneConfig::default_path()))
}

/// Loads the default config file if it exists.
///
/// This runs before logging is initialized, so falling back to defaults is
/// reported on stderr.
fn load_default_config(path: Option<PathBuf>) -> (PruneConfig, Option<PathBuf>) {
    let Some(existing) = path.as_deref().filter(|p| p.exists()) else {
        return (PruneConfig::default(), path);
    };

    match PruneConfig::load_from_file(existing) {
        Ok(config) => (config, path),
        Err(e) => {
            eprintln!(
                "Warning: ignoring config file {} ({e}); using defaults",
                existing.display()
            );
            (PruneConfig::default(), path)
        },
    }
}
