//! Main entry point for the quota translator

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quota_translator::cli::commands::{self, Commands};

/// Quota-guarded Amazon Translate proxy
#[derive(Parser, Debug)]
#[command(name = "quota-translator", version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_ansi(false))
        .init();

    // Lambda starts the binary without arguments
    match args.command.unwrap_or(Commands::Lambda) {
        Commands::Lambda => commands::handle_lambda().await?,
        Commands::Invoke { event } => commands::handle_invoke(event).await?,
        Commands::Server { host, port } => commands::handle_server(host, port).await?,
    }

    Ok(())
}
