//! Streaming downloader with manual redirect handling.
//!
//! Asset downloads bounce through CDN redirects, so the shared HTTP client
//! is built with automatic redirects disabled and the hop-following logic
//! lives here where it can be bounded and observed. The destination file is
//! opened only after the final hop answers with a success status: an
//! intermediate response must never leave bytes behind in the output file.
//! Bodies are streamed to disk chunk by chunk; release archives run to tens
//! of megabytes and are never buffered whole.

use reqwest::header;
use reqwest::redirect::Policy;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::constants::{MAX_REDIRECTS, USER_AGENT};
use crate::core::TypmanError;

/// Redirect statuses the downloader will follow.
const REDIRECT_STATUSES: &[u16] = &[301, 302, 303, 307, 308];

/// Build the crate-wide HTTP client: identifying user agent, no automatic
/// redirects.
///
/// # Errors
///
/// Returns [`TypmanError::Network`] if the TLS backend cannot initialize.
pub fn client() -> Result<reqwest::Client, TypmanError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .redirect(Policy::none())
        .build()
        .map_err(|e| TypmanError::Network {
            operation: "HTTP client construction".to_string(),
            reason: e.to_string(),
        })
}

/// Download `url` to `destination`, following up to [`MAX_REDIRECTS`] hops.
///
/// # Errors
///
/// Returns [`TypmanError::Download`] when the redirect chain is broken (no
/// `Location`, too many hops), the terminal status is not a success, or the
/// destination cannot be written. No destination file is created in any of
/// the failure cases that precede the terminal response.
pub async fn fetch(
    http: &reqwest::Client,
    url: &str,
    destination: &Path,
) -> Result<(), TypmanError> {
    let download_error = |reason: String| TypmanError::Download {
        url: url.to_string(),
        reason,
    };

    let mut current_url = url.to_string();
    let mut hops_left = MAX_REDIRECTS;

    let response = loop {
        let response = http
            .get(&current_url)
            .header(header::ACCEPT, "application/octet-stream")
            .send()
            .await
            .map_err(|e| download_error(e.to_string()))?;

        let status = response.status();
        if REDIRECT_STATUSES.contains(&status.as_u16()) {
            let next_url = response
                .headers()
                .get(header::LOCATION)
                .and_then(|value| value.to_str().ok())
                .map(ToString::to_string)
                .ok_or_else(|| {
                    download_error(format!("redirect ({status}) missing Location header"))
                })?;

            if hops_left == 0 {
                return Err(download_error(format!(
                    "redirect limit of {MAX_REDIRECTS} exceeded"
                )));
            }

            debug!("following redirect ({status}) to {next_url}");
            current_url = next_url;
            hops_left -= 1;
            continue;
        }

        if !status.is_success() {
            return Err(download_error(format!("HTTP {status}")));
        }

        break response;
    };

    // Terminal response reached; only now does the destination get
    // created/truncated.
    let mut file = File::create(destination).await.map_err(|e| {
        download_error(format!("cannot create {}: {e}", destination.display()))
    })?;

    let mut response = response;
    let mut written: u64 = 0;
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| download_error(format!("body read failed: {e}")))?
    {
        file.write_all(&chunk).await.map_err(|e| {
            download_error(format!("cannot write {}: {e}", destination.display()))
        })?;
        written += chunk.len() as u64;
    }

    file.flush()
        .await
        .map_err(|e| download_error(format!("cannot flush {}: {e}", destination.display())))?;

    debug!("downloaded {written} bytes to {}", destination.display());
    Ok(())
}
