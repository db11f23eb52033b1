//! Archive extraction into scratch space.
//!
//! Release assets arrive either as `.zip` (Windows) or `.tar.gz` (everything
//! else). Dispatch is by file name: a name ending in `.zip` takes the zip
//! strategy, anything else is treated as gzip-compressed tar. Both
//! strategies materialize the archive's full tree under the destination,
//! preserving relative paths.
//!
//! The zip and tar readers are synchronous, so extraction runs under
//! `spawn_blocking` to keep the async pipeline unblocked. Decoder
//! diagnostics are carried into [`TypmanError::Extraction`] verbatim; a
//! truncated download usually shows up here first.

use flate2::read::GzDecoder;
use std::fs::File;
use std::path::Path;
use tar::Archive;
use tracing::debug;
use zip::ZipArchive;

use crate::core::TypmanError;

/// Unpack `archive_path` into `destination`.
///
/// # Errors
///
/// Returns [`TypmanError::Extraction`] when the archive cannot be opened or
/// decoded; the underlying library's diagnostic is preserved in the error.
pub async fn extract(archive_path: &Path, destination: &Path) -> Result<(), TypmanError> {
    let archive_name = display_name(archive_path);
    let archive_path = archive_path.to_path_buf();
    let destination = destination.to_path_buf();

    tokio::task::spawn_blocking(move || extract_sync(&archive_path, &destination))
        .await
        .map_err(|e| TypmanError::Extraction {
            archive: archive_name,
            reason: format!("extraction task panicked: {e}"),
        })?
}

fn extract_sync(archive_path: &Path, destination: &Path) -> Result<(), TypmanError> {
    let archive_name = display_name(archive_path);
    let extraction_error = |reason: String| TypmanError::Extraction {
        archive: archive_name.clone(),
        reason,
    };

    let file = File::open(archive_path)
        .map_err(|e| extraction_error(format!("cannot open archive: {e}")))?;

    if archive_name.ends_with(".zip") {
        let mut archive =
            ZipArchive::new(file).map_err(|e| extraction_error(e.to_string()))?;
        archive.extract(destination).map_err(|e| extraction_error(e.to_string()))?;
        debug!("extracted zip archive '{archive_name}' to {}", destination.display());
    } else {
        let decoder = GzDecoder::new(file);
        let mut archive = Archive::new(decoder);
        archive.unpack(destination).map_err(|e| extraction_error(e.to_string()))?;
        debug!("extracted tar.gz archive '{archive_name}' to {}", destination.display());
    }

    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name().map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}
