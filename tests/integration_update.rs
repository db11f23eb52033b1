//! Integration tests for the explicit update driver (`typman update`).
//!
//! Covers check-only reporting, forced reinstalls, and the interaction
//! between a missing binary and `--check`.

mod common;

use common::{archive_for, asset_name_for, fake_cli_script, release_json};
use typman::config::{GlobalConfig, UpdateConfig, UpdatePolicy};
use typman::lifecycle::{BinaryManager, EnsureAction};
use typman::platform;

fn test_config(storage: &std::path::Path, releases_url: String) -> GlobalConfig {
    GlobalConfig {
        storage_dir: Some(storage.to_string_lossy().into_owned()),
        releases_url,
        update: UpdateConfig {
            policy: UpdatePolicy::Notify,
        },
        ..GlobalConfig::default()
    }
}

#[tokio::test]
async fn test_update_installs_missing_binary() {
    let storage = tempfile::tempdir().unwrap();
    let target = platform::resolve().unwrap();
    let asset_name = asset_name_for(&target);

    let mut server = mockito::Server::new_async().await;
    let download_url = format!("{}/download/{asset_name}", server.url());

    server
        .mock("GET", "/releases/latest")
        .with_status(200)
        .with_body(release_json("v0.3.1", &[(&asset_name, &download_url)]))
        .create_async()
        .await;
    let archive = archive_for(&target, &[(target.binary_name, fake_cli_script("v0.3.1").as_slice())]);
    server
        .mock("GET", format!("/download/{asset_name}").as_str())
        .with_status(200)
        .with_body(archive)
        .create_async()
        .await;

    let config = test_config(storage.path(), format!("{}/releases/latest", server.url()));
    let report = BinaryManager::new(config).unwrap().update(false).await.unwrap();

    assert_eq!(
        report.action,
        EnsureAction::Installed {
            version: "0.3.1".to_string()
        }
    );
    assert!(storage.path().join(target.binary_name).is_file());
}

#[tokio::test]
async fn test_check_only_reports_missing_binary_without_installing() {
    let storage = tempfile::tempdir().unwrap();
    let target = platform::resolve().unwrap();
    let asset_name = asset_name_for(&target);

    let mut server = mockito::Server::new_async().await;
    let download_url = format!("{}/download/{asset_name}", server.url());

    server
        .mock("GET", "/releases/latest")
        .with_status(200)
        .with_body(release_json("v0.3.1", &[(&asset_name, &download_url)]))
        .create_async()
        .await;
    let download = server
        .mock("GET", format!("/download/{asset_name}").as_str())
        .with_status(200)
        .with_body(b"never served".as_slice())
        .expect(0)
        .create_async()
        .await;

    let config = test_config(storage.path(), format!("{}/releases/latest", server.url()));
    let report = BinaryManager::new(config).unwrap().update(true).await.unwrap();

    download.assert_async().await;
    assert_eq!(
        report.action,
        EnsureAction::UpdateAvailable {
            installed: None,
            latest: "0.3.1".to_string(),
        }
    );
    assert!(!storage.path().join(target.binary_name).exists());
}

#[cfg(unix)]
#[tokio::test]
async fn test_check_only_reports_outdated_binary() {
    let storage = tempfile::tempdir().unwrap();
    let target = platform::resolve().unwrap();
    let binary = storage.path().join(target.binary_name);
    let old_script = fake_cli_script("v0.3.0");
    write_executable(&binary, &old_script);

    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/releases/latest")
        .with_status(200)
        .with_body(release_json("v0.3.1", &[]))
        .create_async()
        .await;

    let config = test_config(storage.path(), format!("{}/releases/latest", server.url()));
    let report = BinaryManager::new(config).unwrap().update(true).await.unwrap();

    assert_eq!(
        report.action,
        EnsureAction::UpdateAvailable {
            installed: Some("0.3.0".to_string()),
            latest: "0.3.1".to_string(),
        }
    );
    assert_eq!(std::fs::read(&binary).unwrap(), old_script);
}

#[cfg(unix)]
#[tokio::test]
async fn test_update_skips_when_already_latest() {
    let storage = tempfile::tempdir().unwrap();
    let target = platform::resolve().unwrap();
    let binary = storage.path().join(target.binary_name);
    write_executable(&binary, &fake_cli_script("v0.3.1"));

    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/releases/latest")
        .with_status(200)
        .with_body(release_json("v0.3.1", &[]))
        .create_async()
        .await;

    let config = test_config(storage.path(), format!("{}/releases/latest", server.url()));
    let report = BinaryManager::new(config).unwrap().update(false).await.unwrap();

    assert_eq!(
        report.action,
        EnsureAction::UpToDate {
            version: "0.3.1".to_string()
        }
    );
}

#[cfg(unix)]
#[tokio::test]
async fn test_force_reinstalls_matching_version() {
    let storage = tempfile::tempdir().unwrap();
    let target = platform::resolve().unwrap();
    let binary = storage.path().join(target.binary_name);
    let old_script = fake_cli_script("v0.3.1");
    write_executable(&binary, &old_script);

    // Same version, different bytes, so the reinstall is observable.
    let reissued_script = b"#!/bin/sh\n# rebuilt\necho v0.3.1\n".to_vec();

    let mut server = mockito::Server::new_async().await;
    let asset_name = asset_name_for(&target);
    let download_url = format!("{}/download/{asset_name}", server.url());

    server
        .mock("GET", "/releases/latest")
        .with_status(200)
        .with_body(release_json("v0.3.1", &[(&asset_name, &download_url)]))
        .expect(2)
        .create_async()
        .await;
    let archive = archive_for(&target, &[(target.binary_name, reissued_script.as_slice())]);
    server
        .mock("GET", format!("/download/{asset_name}").as_str())
        .with_status(200)
        .with_body(archive)
        .create_async()
        .await;

    let config = test_config(storage.path(), format!("{}/releases/latest", server.url()));
    let report = BinaryManager::new(config)
        .unwrap()
        .force(true)
        .update(false)
        .await
        .unwrap();

    assert_eq!(
        report.action,
        EnsureAction::Updated {
            from: Some("0.3.1".to_string()),
            to: "0.3.1".to_string(),
        }
    );
    assert_eq!(std::fs::read(&binary).unwrap(), reissued_script);
    assert!(common::leftover_scratch_dirs(storage.path()).is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn test_update_replaces_outdated_binary() {
    let storage = tempfile::tempdir().unwrap();
    let target = platform::resolve().unwrap();
    let binary = storage.path().join(target.binary_name);
    write_executable(&binary, &fake_cli_script("v0.2.9"));

    let mut server = mockito::Server::new_async().await;
    let asset_name = asset_name_for(&target);
    let download_url = format!("{}/download/{asset_name}", server.url());

    server
        .mock("GET", "/releases/latest")
        .with_status(200)
        .with_body(release_json("v0.3.1", &[(&asset_name, &download_url)]))
        .expect(2)
        .create_async()
        .await;
    let archive = archive_for(&target, &[(target.binary_name, fake_cli_script("v0.3.1").as_slice())]);
    server
        .mock("GET", format!("/download/{asset_name}").as_str())
        .with_status(200)
        .with_body(archive)
        .create_async()
        .await;

    let config = test_config(storage.path(), format!("{}/releases/latest", server.url()));
    let report = BinaryManager::new(config).unwrap().update(false).await.unwrap();

    assert_eq!(
        report.action,
        EnsureAction::Updated {
            from: Some("0.2.9".to_string()),
            to: "0.3.1".to_string(),
        }
    );
    let probed = typman::version::installed_version(&binary).await;
    assert_eq!(probed.as_deref(), Some("0.3.1"));
}

#[tokio::test]
async fn test_update_refuses_explicitly_configured_path() {
    let config = GlobalConfig {
        cli_path: Some("/opt/typmark/typmark-cli".to_string()),
        releases_url: "http://127.0.0.1:1/releases/latest".to_string(),
        ..GlobalConfig::default()
    };

    let err = BinaryManager::new(config).unwrap().update(false).await.unwrap_err();
    assert!(err.to_string().contains("cli_path"), "unexpected error: {err}");
}

/// Write `contents` to `path` with the executable bit set.
#[cfg(unix)]
fn write_executable(path: &std::path::Path, contents: &[u8]) {
    use std::os::unix::fs::PermissionsExt;
    std::fs::write(path, contents).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}
