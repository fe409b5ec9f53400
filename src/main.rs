//! fm - run file-manager operations on a remote server
//!
//! # Usage
//! ```bash
//! fm rename ~/Music --recursive              # Rename files, live progress
//! fm organize /data/inbox /data/sorted       # Organize by extension
//! fm photo-organize                          # Pick both folders interactively
//! fm browse                                  # Directory picker, prints the choice
//! fm ls /data --files                        # One-shot listing
//! fm watch 6f1c...                           # Follow an operation started elsewhere
//! ```

mod cli;

use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fmclient::config::{ClientConfig, DEFAULT_SERVER, DEFAULT_TIMEOUT_SECS};

/// File Manager client - drive a file-manager server from the terminal
#[derive(Parser)]
#[command(name = "fm")]
#[command(about = "Run file-manager operations on a remote server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Base URL of the file-manager API
    #[arg(long, env = "FM_SERVER", default_value = DEFAULT_SERVER, global = true)]
    server: String,

    /// Progress channel URL (derived from --server when omitted)
    #[arg(long, env = "FM_PROGRESS_URL", global = true)]
    progress_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "FM_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    timeout: u64,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args, Clone, Copy)]
struct ProgressArgs {
    /// Do not follow live progress
    #[arg(long)]
    no_progress: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Rename files in a directory
    Rename {
        #[arg(value_name = "SOURCE_DIR")]
        source: Option<String>,
        /// Include files in subdirectories
        #[arg(short, long)]
        recursive: bool,
        #[command(flatten)]
        progress: ProgressArgs,
    },
    /// Organize files into folders by type
    Organize {
        #[arg(value_name = "SOURCE_DIR")]
        source: Option<String>,
        #[arg(value_name = "DEST_DIR")]
        destination: Option<String>,
        #[command(flatten)]
        progress: ProgressArgs,
    },
    /// Move files out of nested folders into one destination
    Extract {
        #[arg(value_name = "SOURCE_DIR")]
        source: Option<String>,
        #[arg(value_name = "DEST_DIR")]
        destination: Option<String>,
        #[command(flatten)]
        progress: ProgressArgs,
    },
    /// Organize photos and videos by date taken
    PhotoOrganize {
        #[arg(value_name = "SOURCE_DIR")]
        source: Option<String>,
        #[arg(value_name = "DEST_DIR")]
        destination: Option<String>,
        #[command(flatten)]
        progress: ProgressArgs,
    },
    /// Find and remove duplicate files
    FindDuplicates {
        #[arg(value_name = "DIR")]
        directory: Option<String>,
        #[command(flatten)]
        progress: ProgressArgs,
    },
    /// Print the server user's home directory
    Home,
    /// List filesystem roots
    Roots,
    /// List a directory
    Ls {
        #[arg(value_name = "PATH")]
        path: Option<String>,
        /// Include files, not only directories
        #[arg(short, long)]
        files: bool,
    },
    /// Check whether a path exists and is a directory
    Validate {
        #[arg(value_name = "PATH")]
        path: String,
    },
    /// Pick a directory interactively and print it
    Browse {
        #[arg(value_name = "INITIAL_PATH")]
        initial: Option<String>,
        /// Show files as well as directories
        #[arg(short, long)]
        files: bool,
    },
    /// Follow the progress of an operation by id
    Watch {
        #[arg(value_name = "OPERATION_ID")]
        operation_id: String,
    },
}

fn build_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    let mut config = ClientConfig::new(&cli.server)?.with_timeout(Duration::from_secs(cli.timeout));
    if let Some(url) = &cli.progress_url {
        config = config.with_progress_url(url)?;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing (quiet unless asked)
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = build_config(&cli)?;
    let ctx = cli::Context::new(config)?;

    let outcome = cli::dispatch(&ctx, cli.command).await;

    // The shared channel is only ever closed here
    ctx.channel.disconnect().await;

    match outcome {
        Ok(cli::Outcome::Success) => Ok(()),
        Ok(cli::Outcome::Failed) => std::process::exit(1),
        Err(e) => Err(e),
    }
}
