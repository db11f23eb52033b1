//! Placing the located binary at its managed destination.
//!
//! Rename is the fast path: atomic, and on the same filesystem a pure
//! metadata update, so readers of the destination never observe a partial
//! executable. When rename fails (cross-device moves being the usual cause)
//! the fallback copies the contents and then deletes the source. The
//! fallback is not atomic with respect to concurrent readers of the
//! destination; the in-process per-path lock in the lifecycle layer is what
//! keeps two installers from interleaving here.
//!
//! After placement, non-Windows platforms get mode 0755. Windows has no
//! permission step. A permission failure is reported, never swallowed.

use std::path::Path;
use tokio::fs;
use tracing::{debug, warn};

use crate::core::TypmanError;

/// Move `source` (inside scratch space) to `destination`.
///
/// # Errors
///
/// Returns [`TypmanError::Install`] when both rename and the copy+delete
/// fallback fail, and [`TypmanError::PermissionDenied`] when the executable
/// bit cannot be set afterwards.
pub async fn install(source: &Path, destination: &Path) -> Result<(), TypmanError> {
    match fs::rename(source, destination).await {
        Ok(()) => {
            debug!("renamed {} to {}", source.display(), destination.display());
        }
        Err(rename_err) => {
            warn!(
                "rename to {} failed ({rename_err}), falling back to copy",
                destination.display()
            );
            copy_and_delete(source, destination).await?;
        }
    }

    set_executable(destination).await
}

/// Non-atomic fallback: copy contents, then remove the source.
async fn copy_and_delete(source: &Path, destination: &Path) -> Result<(), TypmanError> {
    fs::copy(source, destination).await.map_err(|e| TypmanError::Install {
        operation: "copy".to_string(),
        path: destination.display().to_string(),
        reason: e.to_string(),
    })?;

    fs::remove_file(source).await.map_err(|e| TypmanError::Install {
        operation: "source removal".to_string(),
        path: source.display().to_string(),
        reason: e.to_string(),
    })?;

    debug!("copied {} to {}", source.display(), destination.display());
    Ok(())
}

#[cfg(unix)]
async fn set_executable(path: &Path) -> Result<(), TypmanError> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).await.map_err(|e| {
        TypmanError::PermissionDenied {
            operation: format!("set executable mode: {e}"),
            path: path.display().to_string(),
        }
    })
}

#[cfg(not(unix))]
async fn set_executable(_path: &Path) -> Result<(), TypmanError> {
    // Executability on Windows comes from the .exe extension.
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_install_moves_binary_into_place() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("scratch").join("typmark-cli");
        std::fs::create_dir_all(source.parent().unwrap()).unwrap();
        std::fs::write(&source, b"binary contents").unwrap();
        let destination = dir.path().join("typmark-cli");

        install(&source, &destination).await.unwrap();

        assert!(!source.exists());
        assert_eq!(std::fs::read(&destination).unwrap(), b"binary contents");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_install_sets_executable_bits() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("typmark-cli.tmp");
        std::fs::write(&source, b"x").unwrap();
        let destination = dir.path().join("typmark-cli");

        install(&source, &destination).await.unwrap();

        let mode = std::fs::metadata(&destination).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[tokio::test]
    async fn test_install_replaces_existing_destination() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("new-typmark-cli");
        std::fs::write(&source, b"new version").unwrap();
        let destination = dir.path().join("typmark-cli");
        std::fs::write(&destination, b"old version").unwrap();

        install(&source, &destination).await.unwrap();

        assert_eq!(std::fs::read(&destination).unwrap(), b"new version");
    }

    #[tokio::test]
    async fn test_copy_fallback_copies_then_removes_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("typmark-cli.tmp");
        std::fs::write(&source, b"payload").unwrap();
        let destination = dir.path().join("typmark-cli");

        copy_and_delete(&source, &destination).await.unwrap();

        assert!(!source.exists());
        assert_eq!(std::fs::read(&destination).unwrap(), b"payload");
    }

    #[tokio::test]
    async fn test_copy_fallback_missing_source_reports_install_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("does-not-exist");
        let destination = dir.path().join("typmark-cli");

        match copy_and_delete(&source, &destination).await {
            Err(TypmanError::Install {
                operation, ..
            }) => assert_eq!(operation, "copy"),
            other => panic!("expected Install error, got {other:?}"),
        }
    }
}
