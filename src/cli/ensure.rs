//! The `typman ensure` command.
//!
//! Guarantees that a usable typmark-cli executable exists, then prints its
//! path and what was done to get there. With the `notify` policy an
//! available update is announced on stderr but not installed; the existing
//! binary stays in service.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::config::GlobalConfig;
use crate::lifecycle::{BinaryManager, EnsureAction, display_update_banner};

/// Arguments for `typman ensure`. The command takes none of its own; the
/// global flags and the config file drive everything.
#[derive(Args)]
pub struct EnsureCommand {}

impl EnsureCommand {
    pub async fn execute(self, config: GlobalConfig) -> Result<()> {
        let manager = BinaryManager::new(config)?;
        let report = manager.ensure().await?;
        let path = report.artifact.path.display();

        match report.action {
            EnsureAction::UsedExplicitPath => {
                println!("{} using configured executable: {path}", "✓".green());
            }
            EnsureAction::Installed {
                version,
            } => {
                println!("{} installed typmark-cli {} at {path}", "✓".green().bold(), version.green());
            }
            EnsureAction::AlreadyPresent => {
                println!("{} typmark-cli present at {path} (update checks disabled)", "✓".green());
            }
            EnsureAction::UpToDate {
                version,
            } => {
                println!("{} typmark-cli {} is up to date at {path}", "✓".green(), version.green());
            }
            EnsureAction::UpdateAvailable {
                installed,
                latest,
            } => {
                display_update_banner(installed.as_deref(), &latest);
                println!("{} typmark-cli available at {path}", "✓".green());
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
        }

        Ok(())
    }
}
