//! The `typman status` command.
//!
//! Read-only snapshot of the managed binary: resolved path, managed flag,
//! existence, probeable version, and the configured update policy. With
//! `--remote` it additionally queries the release endpoint for the latest
//! version. Never installs or modifies anything.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::config::GlobalConfig;
use crate::lifecycle::BinaryManager;

#[derive(Args)]
pub struct StatusCommand {
    /// Also query the release endpoint for the latest version
    #[arg(long)]
    pub remote: bool,
}

impl StatusCommand {
    pub async fn execute(self, config: GlobalConfig) -> Result<()> {
        let manager = BinaryManager::new(config)?;
        let status = manager.status(self.remote).await?;

        let yes_no = |flag: bool| {
            if flag {
                "yes".green()
            } else {
                "no".yellow()
            }
        };

        println!("Path:      {}", status.path.display());
        println!("Managed:   {}", yes_no(status.managed));
        println!("Exists:    {}", yes_no(status.exists));
        println!(
            "Installed: {}",
            status.installed.as_deref().map_or_else(|| "unknown".yellow(), |v| v.green())
        );
        println!("Policy:    {}", status.policy.as_str().cyan());
        if let Some(latest) = status.latest.as_deref() {
            println!("Latest:    {}", latest.green().bold());
        }

        Ok(())
    }
}
