//! Command-line interface for typman.
//!
//! Three subcommands cover the whole lifecycle:
//!
//! - `typman ensure`: guarantee a usable typmark-cli exists, installing or
//!   checking versions as the configured policy dictates.
//! - `typman update`: explicit update driver, with `--check` and `--force`.
//! - `typman status`: read-only report on the managed binary, optionally
//!   querying the latest release with `--remote`.
//!
//! Global flags select the config file (`--config`) and the log level:
//! `-q` shows errors only, the default is `info`, `-v` enables `debug`
//! and `-vv` `trace`. Logs go to stderr; stdout carries only command
//! output.
//!
//! # Examples
//!
//! ```bash
//! typman ensure                  # install or verify the binary
//! typman update --check          # report whether an update exists
//! typman update --force          # reinstall even when up to date
//! typman -v status --remote      # status plus latest release, debug logs
//! typman --config ./t.toml ensure
//! ```

mod ensure;
mod status;
mod update;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::GlobalConfig;

/// Top-level argument structure.
#[derive(Parser)]
#[command(
    name = "typman",
    about = "Manages the typmark-cli executable: download, verify, update",
    version,
    author,
    long_about = "typman keeps a platform-appropriate typmark-cli binary installed and \
                  current, fetching official release archives and installing them \
                  atomically. An explicitly configured cli_path is always used as-is."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Path to the config file (default: ~/.typman/config.toml, or $TYPMAN_CONFIG)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Guarantee a usable typmark-cli binary and print where it is
    Ensure(ensure::EnsureCommand),

    /// Install the latest release, or report that one exists
    Update(update::UpdateCommand),

    /// Show the managed binary's path, version, and configuration
    Status(status::StatusCommand),
}

impl Cli {
    /// The tracing filter directive implied by the verbosity flags.
    ///
    /// `RUST_LOG` still wins when set; this is only the fallback.
    #[must_use]
    pub const fn log_filter(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        }
    }

    /// Load configuration and run the selected subcommand.
    ///
    /// # Errors
    ///
    /// Propagates configuration and command failures; `main` renders them
    /// through the user-friendly error path.
    pub async fn execute(self) -> Result<()> {
        let config = GlobalConfig::load_with_optional(self.config).await?;

        match self.command {
            Commands::Ensure(cmd) => cmd.execute(config).await,
            Commands::Update(cmd) => cmd.execute(config).await,
            Commands::Status(cmd) => cmd.execute(config).await,
        }
    }
}
