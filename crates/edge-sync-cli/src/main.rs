use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "edge-sync")]
#[command(about = "S3 to Akamai NetStorage sync tool", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Drain the change queue and mirror each record to the destination
    Worker {
        /// Path to a YAML configuration file (environment is used if omitted)
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Run a notification batch file through the ingest adapter
    Ingest {
        /// Path to a YAML configuration file (environment is used if omitted)
        #[arg(short, long)]
        config: Option<String>,

        /// Path to the JSON notification batch file
        #[arg(short, long)]
        file: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    // Priority: RUST_LOG env var > verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match cli.verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Worker { config } => {
            commands::worker::run(config.as_deref()).await?;
        }
        Commands::Ingest { config, file } => {
            commands::ingest::run(config.as_deref(), &file).await?;
        }
    }

    Ok(())
}
