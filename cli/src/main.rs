//! Hearth - household logistics from the command line
//!
//! CLI entry point that picks the repository backend and dispatches to
//! the requested command.

mod args;
mod commands;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use common::BackendConfig;

use crate::args::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Verbose mode sets debug level
    init_tracing(cli.verbose);

    let config = BackendConfig::from_env();
    tracing::debug!(?config, "Configuration loaded");

    let result = match cli.command {
        Commands::Backend => commands::backend::execute(&config).await,
        Commands::Storage(args) => commands::storage::execute(args, &config).await,
        Commands::Households(args) => commands::households::execute(args, &config).await,
        Commands::Shopping(args) => commands::shopping::execute(args, &config).await,
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing subscriber
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        "debug".to_string()
    } else {
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string())
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();
}
