mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::QueryArgs;
use crate::config::{Config, LoggingConfig};

#[derive(Parser, Debug)]
#[command(name = "explorer")]
#[command(about = "Explorer CLI - searches and index checks against Elasticsearch")]
#[command(version)]
struct Cli {
    /// Configuration file
    #[arg(
        short,
        long,
        global = true,
        env = "EXPLORER_CONFIG",
        default_value = "explorer.toml"
    )]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the request document a search would send, without sending it
    Compile {
        #[command(flatten)]
        query: QueryArgs,
    },

    /// Run a search and print total, hits and aggregations as JSON
    Search {
        #[command(flatten)]
        query: QueryArgs,
    },

    /// Compare the configured indexes with the backend.
    /// Exits with status 1 when any index is absent or changed.
    IndexStatus {
        /// Only check these indexes (repeatable)
        #[arg(short, long)]
        index: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    init_tracing(&config.logging);
    tracing::debug!("Config file: {}", cli.config.display());

    match cli.command {
        Commands::Compile { query } => {
            commands::run_compile(&config, &query)?;
        }
        Commands::Search { query } => {
            commands::run_search(&config, &query).await?;
        }
        Commands::IndexStatus { index } => {
            if commands::run_index_status(&config, &index).await? {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// Log to stderr so stdout stays machine readable
fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| logging.level.clone()),
    );

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format.eq_ignore_ascii_case("json") {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
