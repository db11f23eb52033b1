//! Global configuration for typman.
//!
//! Settings live in a single TOML file, `~/.typman/config.toml` by default.
//! The location can be overridden with the `TYPMAN_CONFIG` environment
//! variable or the `--config` flag; the flag wins when both are present.
//! A missing file is not an error: every field has a default, so a fresh
//! machine works with no configuration at all.
//!
//! # File Format
//!
//! ```toml
//! # Explicit executable path; when set, typman never downloads or updates.
//! cli_path = "/usr/local/bin/typmark-cli"
//!
//! # Where managed binaries and install scratch space live.
//! storage_dir = "~/.typman/bin"
//!
//! # Release metadata endpoint (point at a mirror if needed).
//! releases_url = "https://api.github.com/repos/miko-misa/typmark/releases/latest"
//!
//! [update]
//! # "auto" | "notify" | "disabled"
//! policy = "notify"
//! ```
//!
//! `cli_path` and `storage_dir` accept `~`, expanded at access time via
//! [`GlobalConfig::effective_cli_path`] and
//! [`GlobalConfig::effective_storage_dir`].

use crate::constants::DEFAULT_RELEASES_URL;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

fn default_releases_url() -> String {
    DEFAULT_RELEASES_URL.to_string()
}

/// What happens when a managed binary is already installed.
///
/// A *missing* binary is always installed regardless of policy; the policy
/// only governs version checks and upgrades of an existing artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UpdatePolicy {
    /// Install a differing release immediately, without prompting.
    Auto,
    /// Check and report; install only on an explicit `typman update`.
    #[default]
    Notify,
    /// Never version-check an artifact that already exists. No network.
    Disabled,
}

impl UpdatePolicy {
    /// Name as it appears in the config file.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Notify => "notify",
            Self::Disabled => "disabled",
        }
    }
}

/// The `[update]` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct UpdateConfig {
    /// Update behavior for an already-installed binary.
    #[serde(default)]
    pub policy: UpdatePolicy,
}

/// Global configuration structure.
///
/// Raw fields mirror the TOML schema; paths stay unexpanded strings so the
/// file round-trips byte-for-byte. Use the `effective_*` accessors to get
/// tilde-expanded [`PathBuf`]s.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Explicit executable path. Setting this disables lifecycle management
    /// entirely: typman trusts the path and never downloads, probes, or
    /// updates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cli_path: Option<String>,

    /// Directory holding managed binaries and install scratch space.
    /// Defaults to `~/.typman/bin`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<String>,

    /// Release metadata endpoint queried for the latest version.
    #[serde(default = "default_releases_url")]
    pub releases_url: String,

    /// Update behavior settings.
    #[serde(default)]
    pub update: UpdateConfig,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            cli_path: None,
            storage_dir: None,
            releases_url: default_releases_url(),
            update: UpdateConfig::default(),
        }
    }
}

impl GlobalConfig {
    /// Default location of the config file: `~/.typman/config.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
            .join(".typman")
            .join("config.toml"))
    }

    /// Resolve which config file to read.
    ///
    /// Priority: the `--config` flag, then the `TYPMAN_CONFIG` environment
    /// variable, then [`Self::default_path`].
    ///
    /// # Errors
    ///
    /// Returns an error only when falling through to the default path and
    /// the home directory cannot be determined.
    pub fn resolve_path(flag: Option<PathBuf>) -> Result<PathBuf> {
        if let Some(path) = flag {
            return Ok(path);
        }
        if let Ok(path) = std::env::var("TYPMAN_CONFIG") {
            return Ok(PathBuf::from(path));
        }
        Self::default_path()
    }

    /// Load configuration, resolving the file location from an optional
    /// `--config` override.
    ///
    /// A file that does not exist yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load_with_optional(flag: Option<PathBuf>) -> Result<Self> {
        let path = Self::resolve_path(flag)?;
        if path.exists() {
            Self::load_from(&path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid TOML.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Save configuration to a specific file path, creating parent
    /// directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }

    /// Explicitly configured executable path, tilde-expanded.
    ///
    /// `Some` means the binary is unmanaged: use the path as-is.
    #[must_use]
    pub fn effective_cli_path(&self) -> Option<PathBuf> {
        self.cli_path.as_deref().filter(|raw| !raw.trim().is_empty()).map(expand_tilde)
    }

    /// Storage directory for managed binaries, tilde-expanded.
    ///
    /// Falls back to `~/.typman/bin` when unset.
    ///
    /// # Errors
    ///
    /// Returns an error if the fallback is needed and the home directory
    /// cannot be determined.
    pub fn effective_storage_dir(&self) -> Result<PathBuf> {
        match self.storage_dir.as_deref() {
            Some(raw) => Ok(expand_tilde(raw)),
            None => Ok(dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(".typman")
                .join("bin")),
        }
    }
}

fn expand_tilde(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}
