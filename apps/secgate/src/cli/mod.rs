//! # secgate CLI Module
//!
//! This module implements the CLI interface for secgate.
//!
//! ## Available Commands
//!
//! - `press` - Press the card button: gate, then fetch the secret cards
//! - `gate` - Run the gate for one level and report the outcome
//! - `level` - Show the starting level and gate settings
//! - `server` - Start the HTTP server
//!
//! Each invocation is its own process, so the level always starts from the
//! configured initial level.

mod commands;

use clap::{Parser, Subcommand};
use secgate_core::{GateError, SecurityLevel};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// secgate - Secured-Action Gate
///
/// Runs privileged actions behind a required security level, logging in
/// first when the current level does not match.
#[derive(Parser, Debug)]
#[command(name = "secgate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML configuration file
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Level the store starts at (none, semi, full)
    #[arg(short = 'L', long, global = true)]
    pub initial_level: Option<String>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Press the card button and wait for the outcome
    Press {
        /// Show full card numbers instead of masked ones
        #[arg(long)]
        reveal: bool,
    },

    /// Run the gate for one level
    Gate {
        /// Required level (none, semi, full)
        #[arg(short, long)]
        level: String,
    },

    /// Show the starting level and gate settings
    Level,

    /// Start HTTP server
    Server {
        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), GateError> {
    let initial_level = cli
        .initial_level
        .as_deref()
        .map(str::parse::<SecurityLevel>)
        .transpose()?;
    let config = load_config(cli.config.as_deref(), initial_level)?;
    let json_mode = cli.json_mode;

    if cli.verbose {
        tracing::info!(?config, "Effective configuration");
    }

    match cli.command {
        Some(Commands::Press { reveal }) => cmd_press(&config, json_mode, reveal).await,
        Some(Commands::Gate { level }) => cmd_gate(&config, json_mode, &level).await,
        Some(Commands::Server { host, port }) => cmd_server(&config, &host, port).await,
        Some(Commands::Level) | None => cmd_level(&config, json_mode),
    }
}
