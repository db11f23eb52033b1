//! Small filesystem helpers shared by the config and lifecycle layers.

use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// Create `path` (and parents) if missing.
///
/// # Errors
///
/// Fails when the path exists but is not a directory, or creation fails.
pub async fn ensure_dir(path: &Path) -> Result<()> {
    if fs::try_exists(path).await.unwrap_or(false) {
        let metadata = fs::metadata(path)
            .await
            .with_context(|| format!("Failed to inspect {}", path.display()))?;
        if !metadata.is_dir() {
            anyhow::bail!("Path exists but is not a directory: {}", path.display());
        }
        return Ok(());
    }

    fs::create_dir_all(path)
        .await
        .with_context(|| format!("Failed to create directory: {}", path.display()))
}

/// Recursively remove `path`, treating "already gone" as success.
///
/// Scratch cleanup runs on both the success and failure paths of an install,
/// so it must tolerate a directory that never got created.
pub async fn remove_dir_if_exists(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => {
            Err(e).with_context(|| format!("Failed to remove directory: {}", path.display()))
        }
    }
}
