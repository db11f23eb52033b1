//! typman CLI entry point
//!
//! This is the main executable for the typmark CLI lifecycle manager.
//! It handles command-line argument parsing, logging setup, error display,
//! and command execution.
//!
//! Commands:
//! - `ensure` - Guarantee a usable typmark-cli binary exists
//! - `update` - Install the latest release, or report that one exists
//! - `status` - Show the managed binary's path, version, and configuration

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use typman::cli;
use typman::core::error::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // RUST_LOG wins over the verbosity flags; logs go to stderr.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    // Colored output needs the virtual terminal on Windows consoles.
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
