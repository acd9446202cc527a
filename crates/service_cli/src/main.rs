//! garble CLI - Command Line Front End for the garble Engine
//!
//! # Commands
//!
//! - `garble compose --run <file> [--text <s>]` - Corrupt text (stdin when `--text` is absent)
//! - `garble plan --run <file>` - Show the seed each operation would receive
//! - `garble check --run <file>` - Decode and validate a run file without running it
//!
//! # Logging
//!
//! Diagnostics go to stderr so stdout carries only the result. The filter
//! comes from `RUST_LOG`; without it, `--verbose` selects `debug` and the
//! default is `warn`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod error;

use error::Result;

/// Deterministic text corruption from the command line
#[derive(Parser)]
#[command(name = "garble")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the configured operations over text
    Compose {
        /// Run file (.toml or .json)
        #[arg(short, long)]
        run: PathBuf,

        /// Input text; read from stdin when omitted
        #[arg(short, long)]
        text: Option<String>,

        /// Master seed, overriding the run file and environment
        #[arg(short, long, allow_hyphen_values = true)]
        seed: Option<String>,
    },

    /// Print the derived seed of every operation
    Plan {
        /// Run file (.toml or .json)
        #[arg(short, long)]
        run: PathBuf,

        /// Master seed, overriding the run file and environment
        #[arg(short, long, allow_hyphen_values = true)]
        seed: Option<String>,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Validate a run file without running it
    Check {
        /// Run file (.toml or .json)
        #[arg(short, long)]
        run: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    debug!("Verbose mode enabled");

    match cli.command {
        Commands::Compose { run, text, seed } => commands::compose::run(&run, text.as_deref(), seed.as_deref()),
        Commands::Plan { run, seed, json } => commands::plan::run(&run, seed.as_deref(), json),
        Commands::Check { run } => commands::check::run(&run),
    }
}
