//! `surtitle` -- CLI binary for the surtitle alignment engine.
//!
//! Provides the following subcommands:
//!
//! - `surtitle replay` -- Follow a script with a recorded transcript.
//! - `surtitle check` -- Validate a script and inspect its trigger zones.
//! - `surtitle normalize` -- Show how text is tokenized for matching.
//! - `surtitle config` -- Show resolved configuration.

use clap::{Parser, Subcommand};

mod commands;

/// Live surtitle alignment engine.
#[derive(Parser)]
#[command(name = "surtitle", about = "Live surtitle alignment engine", version)]
struct Cli {
    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Follow a script with a recorded transcript, printing each cue.
    Replay(commands::replay::ReplayArgs),

    /// Validate a script file.
    Check(commands::check::CheckArgs),

    /// Print the normalized tokens of some text.
    Normalize(commands::normalize_cmd::NormalizeArgs),

    /// Show resolved configuration.
    Config {
        #[command(subcommand)]
        action: ConfigCmd,
    },
}

/// Subcommands for `surtitle config`.
#[derive(Subcommand)]
enum ConfigCmd {
    /// Display the full resolved configuration as JSON.
    Show {
        /// Config file path (overrides auto-discovery).
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Print which config file would be used.
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    match cli.command {
        Commands::Replay(args) => commands::replay::run(args).await?,
        Commands::Check(args) => commands::check::run(args).await?,
        Commands::Normalize(args) => commands::normalize_cmd::run(&args)?,
        Commands::Config { action } => match action {
            ConfigCmd::Show { config } => {
                let config = commands::load_config(config.as_deref()).await?;
                commands::config_cmd::config_show(&config);
            }
            ConfigCmd::Path => commands::config_cmd::config_path(),
        },
    }

    Ok(())
}
