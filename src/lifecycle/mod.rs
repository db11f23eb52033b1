//! Binary lifecycle management for the typmark CLI.
//!
//! This module ties the pipeline stages together: it decides whether the
//! managed executable needs to be installed or refreshed, runs the install
//! pipeline when it does, and reports what happened.
//!
//! # Lifecycle
//!
//! Every `ensure`/`update` invocation walks a fixed state machine:
//!
//! ```text
//! Unresolved -> Resolved -> { Present, Missing }
//!                               |         |
//!                               v         v
//!                  { UpToDate, UpdateOffered, Installing }
//!                               |
//!                               v
//!                        Ready | Failed
//! ```
//!
//! An explicitly configured `cli_path` resolves straight to `Ready`: the
//! path is trusted as-is and never probed, downloaded, or updated. For
//! managed binaries the behavior of an already-present artifact depends on
//! `update.policy`:
//!
//! - `disabled`: present means done; no version check, no network.
//! - `notify`: versions are compared; a difference is reported but nothing
//!   is installed until the user runs `typman update`.
//! - `auto`: a differing release is installed in place immediately.
//!
//! A missing binary is always installed, whatever the policy.
//!
//! # Install pipeline
//!
//! fetch release metadata -> select platform asset -> download archive ->
//! extract -> locate executable -> move into the storage directory. All
//! intermediate work happens in a scratch directory (`tmp-<millis>` under
//! the storage dir) which is removed when the attempt finishes, successful
//! or not. Only a complete, located executable is ever moved to the
//! destination, so a failed attempt never corrupts an existing install.
//!
//! Concurrent calls against the same destination within one process are
//! serialized with an async mutex keyed by destination path. Two separate
//! processes managing the same path are not coordinated; that is assumed
//! not to happen.
//!
//! # Examples
//!
//! ```rust,no_run
//! use typman::config::GlobalConfig;
//! use typman::lifecycle::BinaryManager;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = GlobalConfig::load_with_optional(None).await?;
//! let manager = BinaryManager::new(config)?;
//!
//! let report = manager.ensure().await?;
//! println!("typmark-cli at {}", report.artifact.path.display());
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex as StdMutex, PoisonError};

use anyhow::Result;
use chrono::Utc;
use tokio::fs;
use tokio::sync::{Mutex as TokioMutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use crate::archive;
use crate::config::{GlobalConfig, UpdatePolicy};
use crate::constants::SCRATCH_PREFIX;
use crate::core::TypmanError;
use crate::download;
use crate::install;
use crate::locate;
use crate::platform::{self, PlatformTarget};
use crate::release::{Release, ReleaseClient};
use crate::utils::fs::{ensure_dir, remove_dir_if_exists};
use crate::version;

/// A resolved executable, ready to be invoked by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedArtifact {
    /// Absolute path of the executable.
    pub path: PathBuf,
    /// `false` when the path came from an explicit `cli_path` setting.
    /// Unmanaged artifacts are never probed or updated.
    pub managed: bool,
}

/// What an `ensure`/`update` invocation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnsureAction {
    /// An explicit `cli_path` was configured and used as-is.
    UsedExplicitPath,
    /// The binary was missing and has been installed.
    Installed {
        /// Normalized version that was installed.
        version: String,
    },
    /// The binary exists and the update policy is `disabled`; no check ran.
    AlreadyPresent,
    /// The binary exists and matches the latest release.
    UpToDate {
        /// Normalized version shared by local and remote.
        version: String,
    },
    /// A different release exists but policy left it to the user.
    UpdateAvailable {
        /// Normalized installed version; `None` when the probe failed.
        installed: Option<String>,
        /// Normalized latest remote version.
        latest: String,
    },
    /// The binary was replaced with the latest release.
    Updated {
        /// Version that was installed before, if it could be probed.
        from: Option<String>,
        /// Normalized version now installed.
        to: String,
    },
}

/// Outcome of a successful `ensure`/`update` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnsureReport {
    /// The resolved executable.
    pub artifact: ManagedArtifact,
    /// What the invocation did to produce it.
    pub action: EnsureAction,
}

/// Read-only snapshot of the managed binary, as printed by `typman status`.
#[derive(Debug, Clone)]
pub struct StatusReport {
    /// Resolved executable path.
    pub path: PathBuf,
    /// Whether typman manages this path.
    pub managed: bool,
    /// Whether the file currently exists.
    pub exists: bool,
    /// Normalized version reported by the binary, if probeable.
    pub installed: Option<String>,
    /// Configured update policy.
    pub policy: UpdatePolicy,
    /// Normalized latest remote version, when queried.
    pub latest: Option<String>,
}

/// Stations of one `ensure`/`update` invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Nothing is known yet.
    Unresolved,
    /// Destination path and platform target are known.
    Resolved,
    /// The destination file exists.
    Present,
    /// The destination file does not exist.
    Missing,
    /// Local and remote versions match.
    UpToDate,
    /// A differing release was found but not installed.
    UpdateOffered,
    /// The install pipeline is running.
    Installing,
    /// A usable executable is available.
    Ready,
    /// The invocation aborted with an error.
    Failed,
}

impl LifecycleState {
    const fn label(self) -> &'static str {
        match self {
            Self::Unresolved => "unresolved",
            Self::Resolved => "resolved",
            Self::Present => "present",
            Self::Missing => "missing",
            Self::UpToDate => "up-to-date",
            Self::UpdateOffered => "update-offered",
            Self::Installing => "installing",
            Self::Ready => "ready",
            Self::Failed => "failed",
        }
    }
}

/// Tracks and logs state transitions within one invocation.
struct StateTracker {
    current: LifecycleState,
}

impl StateTracker {
    const fn new() -> Self {
        Self {
            current: LifecycleState::Unresolved,
        }
    }

    fn advance(&mut self, next: LifecycleState) {
        debug!("lifecycle: {} -> {}", self.current.label(), next.label());
        self.current = next;
    }
}

/// Installed-vs-remote version comparison for a present binary.
struct VersionOutlook {
    /// Normalized local version; `None` when the probe failed, which always
    /// counts as outdated.
    installed: Option<String>,
    /// Normalized remote tag.
    latest: String,
}

impl VersionOutlook {
    fn up_to_date(&self) -> bool {
        self.installed.as_deref() == Some(self.latest.as_str())
    }
}

/// Per-destination locks serializing installs within this process.
static DESTINATION_LOCKS: LazyLock<StdMutex<HashMap<PathBuf, Arc<TokioMutex<()>>>>> =
    LazyLock::new(|| StdMutex::new(HashMap::new()));

async fn lock_destination(destination: &Path) -> OwnedMutexGuard<()> {
    let lock = {
        let mut locks = DESTINATION_LOCKS.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(destination.to_path_buf()).or_default())
    };
    lock.lock_owned().await
}

/// Drives the lifecycle of the managed typmark-cli binary.
///
/// Construction resolves the platform target and builds the HTTP client;
/// both are fixed for the manager's lifetime. The manager itself is cheap
/// to move around and all of its operations take `&self`.
pub struct BinaryManager {
    config: GlobalConfig,
    target: PlatformTarget,
    http: reqwest::Client,
    releases: ReleaseClient,
    force: bool,
}

impl BinaryManager {
    /// Create a manager from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TypmanError::UnsupportedPlatform`] when no release asset
    /// exists for the host, or a network error when the HTTP client cannot
    /// be constructed.
    pub fn new(config: GlobalConfig) -> Result<Self> {
        let target = platform::resolve()?;
        let http = download::client()?;
        let releases = ReleaseClient::new(http.clone(), config.releases_url.clone());

        Ok(Self {
            config,
            target,
            http,
            releases,
            force: false,
        })
    }

    /// Reinstall even when the installed version already matches the latest
    /// release. Used by `typman update --force`.
    #[must_use]
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Guarantee that a usable executable exists and report its location.
    ///
    /// This is the main entry point: it installs a missing binary, checks
    /// versions of a present one according to `update.policy`, and always
    /// returns a usable artifact on success. A reported-but-declined update
    /// still yields the existing artifact.
    ///
    /// # Errors
    ///
    /// Any pipeline stage failure aborts the invocation; an existing binary
    /// is left untouched in that case.
    pub async fn ensure(&self) -> Result<EnsureReport> {
        let mut state = StateTracker::new();

        if let Some(path) = self.config.effective_cli_path() {
            state.advance(LifecycleState::Resolved);
            info!("using explicitly configured executable at {}", path.display());
            state.advance(LifecycleState::Ready);
            return Ok(EnsureReport {
                artifact: ManagedArtifact {
                    path,
                    managed: false,
                },
                action: EnsureAction::UsedExplicitPath,
            });
        }

        let storage = self.config.effective_storage_dir()?;
        ensure_dir(&storage).await?;
        let destination = storage.join(self.target.binary_name);
        state.advance(LifecycleState::Resolved);

        let _guard = lock_destination(&destination).await;

        if !fs::try_exists(&destination).await.unwrap_or(false) {
            state.advance(LifecycleState::Missing);
            state.advance(LifecycleState::Installing);
            let version = self.install_latest(&storage, &destination).await?;
            state.advance(LifecycleState::Ready);
            info!("installed typmark-cli {version} at {}", destination.display());
            return Ok(EnsureReport {
                artifact: ManagedArtifact {
                    path: destination,
                    managed: true,
                },
                action: EnsureAction::Installed {
                    version,
                },
            });
        }

        state.advance(LifecycleState::Present);

        if self.config.update.policy == UpdatePolicy::Disabled {
            debug!("update policy is disabled; keeping {} as-is", destination.display());
            state.advance(LifecycleState::Ready);
            return Ok(EnsureReport {
                artifact: ManagedArtifact {
                    path: destination,
                    managed: true,
                },
                action: EnsureAction::AlreadyPresent,
            });
        }

        let outlook = self.version_outlook(&destination).await?;
        if outlook.up_to_date() {
            state.advance(LifecycleState::UpToDate);
            state.advance(LifecycleState::Ready);
            return Ok(EnsureReport {
                artifact: ManagedArtifact {
                    path: destination,
                    managed: true,
                },
                action: EnsureAction::UpToDate {
                    version: outlook.latest,
                },
            });
        }

        if self.config.update.policy == UpdatePolicy::Auto {
            state.advance(LifecycleState::Installing);
            let to = self.install_latest(&storage, &destination).await?;
            state.advance(LifecycleState::Ready);
            info!("updated typmark-cli to {to} at {}", destination.display());
            return Ok(EnsureReport {
                artifact: ManagedArtifact {
                    path: destination,
                    managed: true,
                },
                action: EnsureAction::Updated {
                    from: outlook.installed,
                    to,
                },
            });
        }

        // Notify policy: report the update, keep the existing artifact.
        state.advance(LifecycleState::UpdateOffered);
        state.advance(LifecycleState::Ready);
        Ok(EnsureReport {
            artifact: ManagedArtifact {
                path: destination,
                managed: true,
            },
            action: EnsureAction::UpdateAvailable {
                installed: outlook.installed,
                latest: outlook.latest,
            },
        })
    }

    /// Explicit update driver behind `typman update`.
    ///
    /// Installs a missing binary, reinstalls an outdated (or, with
    /// [`force`](Self::force), any) binary, and with `check_only` reports
    /// instead of installing.
    ///
    /// # Errors
    ///
    /// Refuses when `cli_path` is configured: an explicit path is never
    /// managed. Pipeline failures propagate as in [`ensure`](Self::ensure).
    pub async fn update(&self, check_only: bool) -> Result<EnsureReport> {
        if self.config.effective_cli_path().is_some() {
            return Err(TypmanError::ConfigError {
                message: "cli_path is set; an explicitly configured executable is not managed \
                          and cannot be updated"
                    .to_string(),
            }
            .into());
        }

        let mut state = StateTracker::new();
        let storage = self.config.effective_storage_dir()?;
        ensure_dir(&storage).await?;
        let destination = storage.join(self.target.binary_name);
        state.advance(LifecycleState::Resolved);

        let _guard = lock_destination(&destination).await;

        if !fs::try_exists(&destination).await.unwrap_or(false) {
            state.advance(LifecycleState::Missing);
            if check_only {
                let release = self.releases.fetch_latest().await?;
                let latest = version::normalize(&release.tag_name);
                state.advance(LifecycleState::UpdateOffered);
                return Ok(EnsureReport {
                    artifact: ManagedArtifact {
                        path: destination,
                        managed: true,
                    },
                    action: EnsureAction::UpdateAvailable {
                        installed: None,
                        latest,
                    },
                });
            }
            state.advance(LifecycleState::Installing);
            let version = self.install_latest(&storage, &destination).await?;
            state.advance(LifecycleState::Ready);
            info!("installed typmark-cli {version} at {}", destination.display());
            return Ok(EnsureReport {
                artifact: ManagedArtifact {
                    path: destination,
                    managed: true,
                },
                action: EnsureAction::Installed {
                    version,
                },
            });
        }

        state.advance(LifecycleState::Present);

        let outlook = self.version_outlook(&destination).await?;
        if !self.force && outlook.up_to_date() {
            state.advance(LifecycleState::UpToDate);
            state.advance(LifecycleState::Ready);
            return Ok(EnsureReport {
                artifact: ManagedArtifact {
                    path: destination,
                    managed: true,
                },
                action: EnsureAction::UpToDate {
                    version: outlook.latest,
                },
            });
        }

        if check_only {
            state.advance(LifecycleState::UpdateOffered);
            state.advance(LifecycleState::Ready);
            return Ok(EnsureReport {
                artifact: ManagedArtifact {
                    path: destination,
                    managed: true,
                },
                action: EnsureAction::UpdateAvailable {
                    installed: outlook.installed,
                    latest: outlook.latest,
                },
            });
        }

        state.advance(LifecycleState::Installing);
        let to = self.install_latest(&storage, &destination).await?;
        state.advance(LifecycleState::Ready);
        info!("updated typmark-cli to {to} at {}", destination.display());
        Ok(EnsureReport {
            artifact: ManagedArtifact {
                path: destination,
                managed: true,
            },
            action: EnsureAction::Updated {
                from: outlook.installed,
                to,
            },
        })
    }

    /// Read-only snapshot for `typman status`. Never installs anything.
    ///
    /// # Errors
    ///
    /// Fails only when `include_remote` is set and the release metadata
    /// fetch fails, or when no storage directory can be determined.
    pub async fn status(&self, include_remote: bool) -> Result<StatusReport> {
        let (path, managed) = match self.config.effective_cli_path() {
            Some(explicit) => (explicit, false),
            None => (self.config.effective_storage_dir()?.join(self.target.binary_name), true),
        };

        let exists = fs::try_exists(&path).await.unwrap_or(false);
        let installed = if exists {
            version::installed_version(&path).await
        } else {
            None
        };

        let latest = if include_remote {
            let release = self.releases.fetch_latest().await?;
            Some(version::normalize(&release.tag_name))
        } else {
            None
        };

        Ok(StatusReport {
            path,
            managed,
            exists,
            installed,
            policy: self.config.update.policy,
            latest,
        })
    }

    /// Probe the installed binary and fetch the latest remote tag.
    async fn version_outlook(&self, binary: &Path) -> Result<VersionOutlook> {
        let installed = version::installed_version(binary).await;
        let release = self.releases.fetch_latest().await?;
        let latest = version::normalize(&release.tag_name);
        debug!("installed version {installed:?}, latest release {latest}");
        Ok(VersionOutlook {
            installed,
            latest,
        })
    }

    /// Run the full install pipeline and return the installed version.
    ///
    /// Fetches release metadata fresh so the asset URLs are current at
    /// download time, even when a version check already ran this invocation.
    async fn install_latest(&self, storage: &Path, destination: &Path) -> Result<String> {
        let release = self.releases.fetch_latest().await?;
        let version = version::normalize(&release.tag_name);

        let scratch = storage.join(format!("{SCRATCH_PREFIX}{}", Utc::now().timestamp_millis()));
        ensure_dir(&scratch).await?;
        debug!("install scratch at {}", scratch.display());

        let outcome = self.stage_into(&scratch, &release, destination).await;

        // Cleanup runs on success and failure alike; a cleanup error must
        // not mask the pipeline result.
        if let Err(cleanup) = remove_dir_if_exists(&scratch).await {
            warn!("could not remove scratch directory {}: {cleanup}", scratch.display());
        }

        outcome?;
        Ok(version)
    }

    /// Pipeline stages that operate inside the scratch directory.
    async fn stage_into(&self, scratch: &Path, release: &Release, destination: &Path) -> Result<()> {
        let asset = release.select_asset(&self.target).ok_or_else(|| TypmanError::NoMatchingAsset {
            tag: release.tag_name.clone(),
            suffix: self.target.asset_suffix.to_string(),
        })?;
        debug!("selected asset {} for {}", asset.name, self.target.asset_suffix);

        let archive_path = scratch.join(&asset.name);
        download::fetch(&self.http, &asset.browser_download_url, &archive_path).await?;

        let unpacked = scratch.join("unpacked");
        ensure_dir(&unpacked).await?;
        archive::extract(&archive_path, &unpacked).await?;

        let located = locate::locate(&unpacked, self.target.binary_name).await?;
        install::install(&located, destination).await?;
        Ok(())
    }
}

/// Print the update notice shown under the `notify` policy.
///
/// Goes to stderr so it never mixes with consumable stdout output.
pub fn display_update_banner(installed: Option<&str>, latest: &str) {
    use colored::Colorize;

    let rule = "━".repeat(56);
    let installed = installed.unwrap_or("unknown");

    eprintln!();
    eprintln!("{}", rule.bright_cyan());
    eprintln!("  A new version of typmark-cli is available!");
    eprintln!();
    eprintln!("  Installed version: {}", installed.yellow());
    eprintln!("  Latest version:    {}", latest.green().bold());
    eprintln!();
    eprintln!("  Run {} to install it", "typman update".cyan().bold());
    eprintln!("{}", rule.bright_cyan());
    eprintln!();
}
