//! The `typman update` command.
//!
//! Explicit update driver for the managed binary. Without flags it installs
//! the latest release when the installed version differs (or the binary is
//! missing entirely). `--check` reports instead of installing; `--force`
//! reinstalls even when versions match. The command refuses to run when an
//! explicit `cli_path` is configured, since such a path is never managed.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::config::GlobalConfig;
use crate::lifecycle::{BinaryManager, EnsureAction, display_update_banner};

#[derive(Args)]
pub struct UpdateCommand {
    /// Only report whether an update exists; install nothing
    #[arg(long)]
    pub check: bool,

    /// Reinstall even when the installed version matches the latest release
    #[arg(long)]
    pub force: bool,
}

impl UpdateCommand {
    pub async fn execute(self, config: GlobalConfig) -> Result<()> {
        let manager = BinaryManager::new(config)?.force(self.force);
        let report = manager.update(self.check).await?;
        let path = report.artifact.path.display();

        match report.action {
            EnsureAction::UpToDate {
                version,
            } => {
                println!("{} typmark-cli {} is up to date", "✓".green(), version.green());
            }
            EnsureAction::UpdateAvailable {
                installed,
                latest,
            } => {
                display_update_banner(installed.as_deref(), &latest);
            }
            EnsureAction::Installed {
                version,
            } => {
                println!("{} installed typmark-cli {} at {path}", "✓".green().bold(), version.green());
            }
            EnsureAction::Updated {
                from,
                to,
            } => {
                let from = from.unwrap_or_else(|| "unknown".to_string());
                println!(
                    "{} updated typmark-cli {} -> {} at {path}",
                    "✓".green().bold(),
                    from.yellow(),
                    to.green()
                );
            }
            // update() never resolves an explicit path or skips the check.
            EnsureAction::UsedExplicitPath | EnsureAction::AlreadyPresent => {}
        }

        Ok(())
    }
}
