//! Version-string handling for the managed tool.
//!
//! Two small jobs live here: canonicalizing version strings so that tag
//! prefixes don't defeat comparison, and probing an installed binary for the
//! version it reports.
//!
//! Comparison policy: two versions are "the same" when their normalized
//! strings are equal. There is no ordering; a remote rollback or a locally
//! newer build both count as "different" and trigger an update offer.

use std::path::Path;
use tokio::process::Command;
use tracing::debug;

use crate::constants::VERSION_ARG;

/// Canonicalize a version string: trim whitespace, strip one leading `v`.
///
/// `"v1.2.3"`, `" 1.2.3\n"`, and `"1.2.3"` all normalize to `"1.2.3"`.
#[must_use]
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed.strip_prefix('v').unwrap_or(trimmed).to_string()
}

/// Ask the installed binary which version it is.
///
/// Spawns `<binary> --version` and normalizes whatever it prints to stdout.
/// Every failure mode (spawn error, empty output) collapses to `None`,
/// meaning "unknown". Callers treat an unknown local version as outdated so
/// a broken binary gets repaired by the next update.
pub async fn installed_version(binary: &Path) -> Option<String> {
    let output = match Command::new(binary).arg(VERSION_ARG).output().await {
        Ok(output) => output,
        Err(e) => {
            debug!("version probe could not spawn {}: {e}", binary.display());
            return None;
        }
    };

    if !output.status.success() {
        debug!("version probe exited with {} for {}", output.status, binary.display());
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let version = normalize(&stdout);
    if version.is_empty() {
        None
    } else {
        Some(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_prefix_and_whitespace() {
        assert_eq!(normalize("v1.2.3"), "1.2.3");
        assert_eq!(normalize("1.2.3"), "1.2.3");
        assert_eq!(normalize("  v0.4.0\n"), "0.4.0");
    }

    #[test]
    fn test_normalize_already_canonical_is_unchanged() {
        for raw in ["1.2.3", "2.0.0-rc.1", ""] {
            assert_eq!(normalize(raw), raw);
        }
    }

    #[test]
    fn test_normalize_strips_only_one_v() {
        assert_eq!(normalize("vv1.0"), "v1.0");
        assert_eq!(normalize("version"), "ersion");
    }

    #[tokio::test]
    async fn test_installed_version_missing_binary_is_unknown() {
        let version = installed_version(Path::new("/nonexistent/typmark-cli")).await;
        assert_eq!(version, None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_installed_version_reads_stdout() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("typmark-cli");
        std::fs::write(&script, "#!/bin/sh\necho v0.3.1\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let version = installed_version(&script).await;
        assert_eq!(version.as_deref(), Some("0.3.1"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_installed_version_empty_output_is_unknown() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("typmark-cli");
        std::fs::write(&script, "#!/bin/sh\nexit 0\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let version = installed_version(&script).await;
        assert_eq!(version, None);
    }
}
