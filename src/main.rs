//! PushClash - roast and battle GitHub and LeetCode profiles
//!
//! Starts the HTTP server that the PushClash frontend talks to.

use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::{fmt, EnvFilter};

use pushclash::cli::{Cli, Config};
use pushclash::server;

/// Installs the log subscriber, honouring `RUST_LOG` and defaulting to `info`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(2);
        }
    };

    init_tracing();

    if let Err(e) = server::run(config).await {
        error!(error = %e, "server failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
