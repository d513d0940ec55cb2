//! imgvec - embed images into a vector store and search them by text
//!
//! ## Commands
//!
//! - `imgvec seed` - Embed the configured images and store them
//! - `imgvec search <words...>` - Print the closest stored `jpg` to the query
//! - `imgvec serve` - Start the HTTP API

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "imgvec")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// JSON config file (defaults apply when absent)
    #[arg(short, long, global = true, env = "IMGVEC_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Embed every configured image and upsert it into the collection
    Seed,

    /// Find the stored image closest to a text query
    Search {
        /// Query words, joined with spaces
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Number of matches to print
        #[arg(short = 'n', long, default_value = "1")]
        limit: usize,
    },

    /// Start the HTTP API server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let result = match cli.command {
        Commands::Seed => commands::seed(cli.config.as_deref()).await,
        Commands::Search { query, limit } => commands::search(cli.config.as_deref(), &query.join(" "), limit).await,
        Commands::Serve { host, port } => commands::serve(cli.config.as_deref(), host, port).await,
    };

    ExitCode::from(report(&result))
}

/// Print a failed command's error chain and map the outcome to an exit status.
fn report(result: &anyhow::Result<()>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {e:#}");
            1
        }
    }
}
