//! SkyWatch CLI: the main entry point.
//!
//! Commands:
//! - `serve`       - Scheduler plus HTTP API until Ctrl-C
//! - `collect`     - Run the collection pipeline once
//! - `ask`         - Ask the weather agent, once or interactively
//! - `status`      - Show configuration and record counts
//! - `init-config` - Print a default config file

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "skywatch",
    about = "SkyWatch — weather collection pipeline and weather agent",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: ~/.skywatch/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the scheduler and the HTTP API
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Fetch, clean and store one batch now
    Collect,

    /// Ask the weather agent a question
    Ask {
        /// Ask a single question instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Show configuration and record counts
    Status,

    /// Print a default configuration file
    InitConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Serve { port } => commands::serve::run(config_path, port).await?,
        Commands::Collect => commands::collect::run(config_path).await?,
        Commands::Ask { message } => commands::ask::run(config_path, message).await?,
        Commands::Status => commands::status::run(config_path).await?,
        Commands::InitConfig => commands::init_config::run(),
    }

    Ok(())
}
