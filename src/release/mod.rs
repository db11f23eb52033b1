//! Release metadata: fetching the latest published release and choosing the
//! asset for the current platform.
//!
//! The endpoint is GitHub's `releases/latest` API (or a configured mirror
//! with the same shape). Descriptors are fetched fresh on every check and
//! never persisted; a descriptor only lives long enough to pick an asset.

use serde::Deserialize;
use tracing::debug;

use crate::core::TypmanError;
use crate::platform::PlatformTarget;

/// One downloadable file belonging to a release.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    /// Asset file name, matched against the platform suffix and reused as
    /// the local archive name inside scratch space
    pub name: String,
    /// Direct download URL (may redirect through a CDN)
    pub browser_download_url: String,
}

/// One published release: its tag and downloadable assets, in publish order.
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    /// Raw tag string, possibly `v`-prefixed
    pub tag_name: String,
    /// Assets in the order the endpoint returned them
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

impl Release {
    /// Select the asset for `target`: first asset whose name contains the
    /// platform suffix. `None` means the release ships nothing for this
    /// platform, which callers report rather than guess around.
    #[must_use]
    pub fn select_asset(&self, target: &PlatformTarget) -> Option<&ReleaseAsset> {
        self.assets.iter().find(|asset| asset.name.contains(target.asset_suffix))
    }
}

/// Client for the release metadata endpoint.
///
/// Wraps a shared [`reqwest::Client`] (built by [`crate::download::client`],
/// which disables automatic redirects crate-wide) plus the endpoint URL.
#[derive(Debug, Clone)]
pub struct ReleaseClient {
    http: reqwest::Client,
    releases_url: String,
}

impl ReleaseClient {
    /// Create a client for `releases_url` using the shared HTTP client.
    pub fn new(http: reqwest::Client, releases_url: impl Into<String>) -> Self {
        Self {
            http,
            releases_url: releases_url.into(),
        }
    }

    /// Fetch the latest release descriptor.
    ///
    /// # Errors
    ///
    /// - [`TypmanError::Network`] when the request or body read fails at the
    ///   transport level
    /// - [`TypmanError::Remote`] on any non-2xx status
    /// - [`TypmanError::MalformedResponse`] when the body is not the
    ///   expected release JSON
    pub async fn fetch_latest(&self) -> Result<Release, TypmanError> {
        debug!("fetching release metadata from {}", self.releases_url);

        let response = self
            .http
            .get(&self.releases_url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| TypmanError::Network {
                operation: "release metadata fetch".to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TypmanError::Remote {
                status: status.as_u16(),
                url: self.releases_url.clone(),
            });
        }

        let body = response.text().await.map_err(|e| TypmanError::Network {
            operation: "release metadata read".to_string(),
            reason: e.to_string(),
        })?;

        let release: Release =
            serde_json::from_str(&body).map_err(|e| TypmanError::MalformedResponse {
                reason: e.to_string(),
            })?;

        debug!("latest release is '{}' with {} assets", release.tag_name, release.assets.len());
        Ok(release)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download;
    use serde_json::json;

    fn linux_target() -> PlatformTarget {
        crate::platform::resolve_for("linux", "x86_64").unwrap()
    }

    fn release_with_assets(names: &[&str]) -> Release {
        Release {
            tag_name: "v1.0.0".to_string(),
            assets: names
                .iter()
                .map(|name| ReleaseAsset {
                    name: (*name).to_string(),
                    browser_download_url: format!("https://example.com/{name}"),
                })
                .collect(),
        }
    }

    #[test]
    fn test_select_asset_first_match_wins() {
        let release = release_with_assets(&[
            "typmark-cli-x86_64-unknown-linux-gnu.tar.gz",
            "typmark-cli-aarch64-apple-darwin.tar.gz",
        ]);

        let asset = release.select_asset(&linux_target()).unwrap();
        assert_eq!(asset.name, "typmark-cli-x86_64-unknown-linux-gnu.tar.gz");
    }

    #[test]
    fn test_select_asset_no_match() {
        let release = release_with_assets(&["typmark-cli-aarch64-apple-darwin.tar.gz"]);
        assert!(release.select_asset(&linux_target()).is_none());
    }

    #[tokio::test]
    async fn test_fetch_latest_parses_release() {
        let mut server = mockito::Server::new_async().await;
        let body = json!({
            "tag_name": "v0.4.0",
            "assets": [
                {
                    "name": "typmark-cli-x86_64-unknown-linux-gnu.tar.gz",
                    "browser_download_url": format!("{}/dl/linux.tar.gz", server.url()),
                }
            ]
        });
        let mock = server
            .mock("GET", "/")
            .match_header("accept", "application/vnd.github+json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        let client = ReleaseClient::new(download::client().unwrap(), server.url());
        let release = client.fetch_latest().await.unwrap();

        assert_eq!(release.tag_name, "v0.4.0");
        assert_eq!(release.assets.len(), 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_latest_non_success_is_remote_error() {
        let mut server = mockito::Server::new_async().await;
        server.mock("GET", "/").with_status(503).create_async().await;

        let client = ReleaseClient::new(download::client().unwrap(), server.url());
        match client.fetch_latest().await {
            Err(TypmanError::Remote {
                status, ..
            }) => assert_eq!(status, 503),
            other => panic!("expected Remote error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_latest_bad_json_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/")
            .with_status(200)
            .with_body("not json at all")
            .create_async()
            .await;

        let client = ReleaseClient::new(download::client().unwrap(), server.url());
        assert!(matches!(
            client.fetch_latest().await,
            Err(TypmanError::MalformedResponse { .. })
        ));
    }
}
