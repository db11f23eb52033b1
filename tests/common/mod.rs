//! Common test utilities and fixtures for typman integration tests
//!
//! Builders for release metadata, release archives, and fake typmark-cli
//! binaries, shared across the integration test files.

// Allow dead code because these utilities are used across different test
// files and not all utilities are used in every test file
#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use serde_json::json;
use typman::platform::PlatformTarget;

/// GitHub-shaped latest-release JSON with the given tag and assets.
///
/// `assets` pairs are `(name, browser_download_url)`.
pub fn release_json(tag: &str, assets: &[(&str, &str)]) -> String {
    let assets: Vec<_> = assets
        .iter()
        .map(|(name, url)| {
            json!({
                "name": name,
                "browser_download_url": url,
            })
        })
        .collect();

    json!({
        "tag_name": tag,
        "assets": assets,
    })
    .to_string()
}

/// The asset file name a release would carry for `target`.
pub fn asset_name_for(target: &PlatformTarget) -> String {
    format!("typmark-cli-{}", target.asset_suffix)
}

/// Shell script that prints `version` when invoked (any arguments).
///
/// Stands in for the real typmark-cli in `--version` probes.
pub fn fake_cli_script(version: &str) -> Vec<u8> {
    format!("#!/bin/sh\necho {version}\n").into_bytes()
}

/// Build an in-memory `.tar.gz` archive from `(path, contents)` entries.
///
/// Entries are stored with mode 0755 so extracted binaries are runnable.
pub fn tar_gz_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let gz = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(gz);

    for (path, contents) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder.append_data(&mut header, path, *contents).unwrap();
    }

    builder.into_inner().unwrap().finish().unwrap()
}

/// Build an in-memory `.zip` archive from `(path, contents)` entries.
pub fn zip_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut cursor);
        let options = zip::write::SimpleFileOptions::default().unix_permissions(0o755);

        for (path, contents) in entries {
            writer.start_file(*path, options).unwrap();
            writer.write_all(contents).unwrap();
        }

        writer.finish().unwrap();
    }
    cursor.into_inner()
}

/// Build the archive format the target's asset suffix implies.
pub fn archive_for(target: &PlatformTarget, entries: &[(&str, &[u8])]) -> Vec<u8> {
    if target.asset_suffix.ends_with(".zip") {
        zip_archive(entries)
    } else {
        tar_gz_archive(entries)
    }
}

/// Write a config file and return its path.
pub fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("config.toml");
    std::fs::write(&path, content).unwrap();
    path
}

/// Scratch directories left behind in `storage`, by name prefix.
pub fn leftover_scratch_dirs(storage: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(storage)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().starts_with("tmp-"))
        .map(|entry| entry.path())
        .collect()
}
