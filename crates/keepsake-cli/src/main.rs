//! Keepsake CLI - stash recovery props before a crash, pick them up on the
//! next launch.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use keepsake_config::ResolvedConfig;
use keepsake_recovery::RecoveryPropsStore;

mod commands;
mod config_bridge;
mod report;

use commands::props::Outcome;
use commands::{config, props};
use config_bridge::Backend;

/// Keepsake - one-shot recovery props over a durable key-value store
#[derive(Parser)]
#[command(name = "keepsake")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to load on top of the user config
    #[arg(long, global = true, env = "KEEPSAKE_CONFIG")]
    config: Option<PathBuf>,

    /// Scope id of the app whose slot to use
    #[arg(long, global = true)]
    scope: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store props in the slot, replacing any previous value
    Set {
        /// Props payload
        props: Option<String>,

        /// Read the payload from stdin
        #[arg(long)]
        stdin: bool,
    },

    /// Print the slot's props and clear it (exit code 2 if empty)
    Consume,

    /// Print the slot's props without clearing it (exit code 2 if empty)
    Show,

    /// Clear the slot
    Clear {
        /// Clear every slot in the namespace
        #[arg(long)]
        all: bool,
    },

    /// List scope ids that hold props
    Scopes,

    /// Show the resolved configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let resolved = keepsake_config::Config::load(cli.config.as_deref())?;

    let mut log_config = config_bridge::to_log_config(&resolved);
    if cli.verbose {
        "debug".clone_into(&mut log_config.level);
    }
    if let Err(e) = keepsake_telemetry::setup_logging(&log_config) {
        eprintln!("Failed to initialize logging: {e}");
    }
    for warning in &resolved.warnings {
        eprintln!("{}", report::config_warning(warning));
    }

    if matches!(cli.command, Commands::Config) {
        config::show_config(&resolved)?;
        return Ok(ExitCode::SUCCESS);
    }

    let outcome = run(&resolved, cli.command, cli.scope.as_deref(), &mut std::io::stdout()).await?;
    Ok(outcome.into())
}

/// Open the backend, run one slot command against it and close it again.
///
/// The backend is closed whether or not the command succeeded; a command
/// error wins over a close error.
async fn run(
    resolved: &ResolvedConfig,
    command: Commands,
    scope: Option<&str>,
    out: &mut impl Write,
) -> Result<Outcome> {
    let backend = Backend::open(resolved)?;
    let outcome = dispatch(&backend, resolved, command, scope, out).await;
    let closed = backend.close().await;
    let outcome = outcome?;
    closed?;
    Ok(outcome)
}

async fn dispatch(
    backend: &Backend,
    resolved: &ResolvedConfig,
    command: Commands,
    scope: Option<&str>,
    out: &mut impl Write,
) -> Result<Outcome> {
    let slot = config_bridge::to_recovery_slot(&resolved.config, scope)?;
    let store = RecoveryPropsStore::new(backend.kv(), slot);
    tracing::debug!(slot = %store.slot(), "opened recovery slot");

    match command {
        Commands::Set { props, stdin } => {
            let input = stdin.then(std::io::stdin);
            props::set(&store, props, input).await
        },
        Commands::Consume => props::consume(&store, out).await,
        Commands::Show => props::show(&store, out).await,
        Commands::Clear { all } => props::clear(&store, all).await,
        Commands::Scopes => props::scopes(&store, out).await,
        Commands::Config => Ok(Outcome::Done),
    }
}
