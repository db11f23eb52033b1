//! Locating the executable inside an extracted archive tree.
//!
//! Release archives differ on where they put the binary: some at the root,
//! some under a `name-target/` directory, some under `bin/`. The locator
//! walks the whole extracted tree depth-first. A file or symlink whose name
//! exactly equals the expected binary name wins immediately; the exact match
//! always beats any heuristic. Only when no exact match exists anywhere does
//! the locator fall back to "likely" candidates (files whose name starts
//! with the tool base name, plus an `.exe` requirement on Windows, collected
//! across the whole tree) and accepts them only when exactly one exists.
//! Ambiguity is reported, never guessed away.
//!
//! The walk does not follow symlinked directories, so no directory is
//! visited twice. `walkdir` is synchronous; the public entry point wraps it
//! in `spawn_blocking`.

use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::constants::{LISTING_CAP, TOOL_BASE_NAME};
use crate::core::TypmanError;

/// Find the binary named `expected_name` under `root`.
///
/// # Errors
///
/// - [`TypmanError::BinaryNotFound`] when nothing matches, with a truncated
///   listing of the files that were examined
/// - [`TypmanError::AmbiguousBinary`] when several heuristic candidates
///   exist and none matches exactly
pub async fn locate(root: &Path, expected_name: &str) -> Result<PathBuf, TypmanError> {
    let root = root.to_path_buf();
    let expected_name = expected_name.to_string();

    tokio::task::spawn_blocking(move || locate_sync(&root, &expected_name, cfg!(windows)))
        .await
        .map_err(|e| TypmanError::Other {
            message: format!("locator task panicked: {e}"),
        })?
}

fn locate_sync(
    root: &Path,
    expected_name: &str,
    windows: bool,
) -> Result<PathBuf, TypmanError> {
    let mut candidates: Vec<PathBuf> = Vec::new();

    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| TypmanError::Other {
            message: format!("cannot walk {}: {e}", root.display()),
        })?;
        let file_type = entry.file_type();
        let name = entry.file_name().to_string_lossy();

        if (file_type.is_file() || file_type.is_symlink()) && name == expected_name {
            debug!("exact binary match at {}", entry.path().display());
            return Ok(entry.path().to_path_buf());
        }

        if file_type.is_file() && is_likely_binary(&name, windows) {
            candidates.push(entry.path().to_path_buf());
        }
    }

    match candidates.len() {
        1 => {
            let found = candidates.remove(0);
            debug!("single heuristic candidate at {}", found.display());
            Ok(found)
        }
        0 => Err(TypmanError::BinaryNotFound {
            expected: expected_name.to_string(),
            listing: list_files(root),
        }),
        _ => Err(TypmanError::AmbiguousBinary {
            expected: expected_name.to_string(),
            candidates: bounded_join(
                candidates.iter().map(|p| p.display().to_string()),
            ),
        }),
    }
}

/// Heuristic for files that look like the tool binary when the exact name is
/// absent. Windows archives are matched case-insensitively and must carry
/// `.exe`; elsewhere a bare prefix match is enough.
fn is_likely_binary(name: &str, windows: bool) -> bool {
    if windows {
        let lower = name.to_lowercase();
        lower.starts_with(TOOL_BASE_NAME) && lower.ends_with(".exe")
    } else {
        name.starts_with(TOOL_BASE_NAME)
    }
}

/// Bounded listing of files under `root` (relative paths) for diagnostics.
fn list_files(root: &Path) -> String {
    let paths = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            entry
                .path()
                .strip_prefix(root)
                .unwrap_or_else(|_| entry.path())
                .display()
                .to_string()
        });
    bounded_join(paths)
}

fn bounded_join(items: impl Iterator<Item = String>) -> String {
    let mut shown: Vec<String> = Vec::with_capacity(LISTING_CAP);
    let mut truncated = false;
    for item in items {
        if shown.len() == LISTING_CAP {
            truncated = true;
            break;
        }
        shown.push(item);
    }
    if truncated {
        shown.push("...".to_string());
    }
    shown.join(", ")
}
