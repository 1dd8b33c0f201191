//! Shopdesk CLI - database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending migrations
//! sd-cli migrate
//!
//! # Load a demo catalog
//! sd-cli seed demo.yaml
//!
//! # Print the dashboard counters
//! sd-cli stats
//! ```
//!
//! Every command reads `ADMIN_DATABASE_URL` (or `DATABASE_URL`), loading a
//! `.env` file first if one exists.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "sd-cli")]
#[command(author, version, about = "Shopdesk CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Load brands, categories, customers and products from a YAML file
    Seed {
        /// Path to the seed file
        file: PathBuf,
    },
    /// Print store counters
    Stats {
        /// Year of the products-per-month breakdown (default: current UTC year)
        #[arg(short, long)]
        year: Option<i32>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sd_cli=info,shopdesk_admin=info".into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file } => commands::seed::run(&file).await?,
        Commands::Stats { year } => commands::stats::run(year).await?,
    }
    Ok(())
}
