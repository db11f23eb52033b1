//! typman - lifecycle manager for the typmark CLI
//!
//! typman guarantees that a valid, correctly-versioned `typmark-cli`
//! executable exists at a known location before any caller needs it. It
//! resolves the platform-appropriate release asset, downloads and extracts
//! official release archives, and installs the executable atomically, with
//! all intermediate work confined to scratch space so a failed attempt never
//! corrupts an existing install.
//!
//! # Architecture Overview
//!
//! The install pipeline runs in fixed stages, each owned by one module:
//!
//! 1. [`platform`] - map the host OS/architecture to a release asset suffix
//!    and executable name
//! 2. [`release`] - fetch latest-release metadata and select the matching
//!    asset
//! 3. [`download`] - stream the archive to disk, following redirects
//!    manually with a bounded hop count
//! 4. [`archive`] - unpack zip or gzipped tar archives
//! 5. [`locate`] - find the executable inside the extracted tree, exact
//!    name first, heuristics only as an unambiguous fallback
//! 6. [`install`] - move it into place (rename, falling back to
//!    copy+delete) and set the executable bit
//!
//! [`lifecycle`] drives those stages according to the configuration in
//! [`config`]: an explicit `cli_path` bypasses management entirely, a
//! missing binary is always installed, and a present one is version-checked
//! and updated as `update.policy` dictates.
//!
//! ## Key Properties
//!
//! - **Trust explicit paths**: a configured `cli_path` is never probed,
//!   downloaded, or replaced
//! - **No partial installs**: only a complete, located executable is ever
//!   moved to the destination
//! - **Scratch is transient**: per-attempt `tmp-<millis>` directories are
//!   removed on success and failure alike
//! - **String-equality versions**: normalized tags are compared for
//!   equality only; no ordering is inferred
//! - **Cross-platform**: Windows, macOS (Intel and Apple Silicon), and
//!   Linux targets with proper `.exe` and permission handling
//!
//! # Command-Line Usage
//!
//! ```bash
//! # Install the binary if missing, check versions per policy
//! typman ensure
//!
//! # Report whether a newer release exists
//! typman update --check
//!
//! # Install the latest release
//! typman update
//!
//! # Inspect the managed binary and configuration
//! typman status --remote
//! ```
//!
//! # Library Usage
//!
//! Everything outside [`cli`] works without the command-line layer:
//!
//! ```rust,no_run
//! use typman::config::GlobalConfig;
//! use typman::lifecycle::BinaryManager;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = GlobalConfig::load_with_optional(None).await?;
//! let report = BinaryManager::new(config)?.ensure().await?;
//!
//! // Invoke report.artifact.path as a subprocess from here on.
//! println!("typmark-cli at {}", report.artifact.path.display());
//! # Ok(())
//! # }
//! ```

// Pipeline stages
pub mod archive;
pub mod download;
pub mod install;
pub mod locate;
pub mod platform;
pub mod release;
pub mod version;

// Orchestration
pub mod cli;
pub mod config;
pub mod lifecycle;

// Supporting modules
pub mod constants;
pub mod core;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
