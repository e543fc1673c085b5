//! HTTP client for the viewer endpoints.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::io::AsyncWriteExt;

use super::{VerifyRequest, VerifyResponse, ViewerApi, ViewerStats};
use crate::error::{Error, Result};

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// [`ViewerApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpViewerApi {
    client: Client,
    base_url: String,
}

impl HttpViewerApi {
    /// Create a client for the sharing device at `base_url`
    /// (for example `http://192.168.1.20:1111`).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Download the shared file into `dest`, returning the bytes written.
    ///
    /// The body is streamed into a `.part` file next to `dest`, which is
    /// renamed into place once complete and removed if the transfer fails.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DownloadRefused`] when the server answers with a
    /// client error (limit reached, link expired), a transport error when
    /// unreachable or interrupted, or an I/O error when `dest` cannot be
    /// written.
    pub async fn download_to(&self, dest: &Path) -> Result<u64> {
        let response = self
            .client
            .get(self.url("/api/download"))
            .send()
            .await
            .map_err(|e| Error::TransportOffline(e.to_string()))?;

        let status = response.status();
        if status.is_client_error() {
            let reason = response.text().await.unwrap_or_default();
            let reason = reason.trim();
            return Err(Error::DownloadRefused(if reason.is_empty() {
                status.to_string()
            } else {
                reason.to_string()
            }));
        }
        if !status.is_success() {
            return Err(Error::TransportOffline(format!("unexpected status {status}")));
        }

        let partial = partial_path(dest);
        let written = match write_body(response, &partial).await {
            Ok(written) => written,
            Err(e) => {
                if let Err(remove_err) = tokio::fs::remove_file(&partial).await {
                    tracing::debug!(path = %partial.display(), error = %remove_err, "No partial download to remove");
                }
                tracing::warn!(path = %dest.display(), error = %e, "Download failed");
                return Err(e);
            }
        };
        tokio::fs::rename(&partial, dest).await?;

        tracing::info!(path = %dest.display(), bytes = written, "Download finished");
        Ok(written)
    }
}

async fn write_body(mut response: reqwest::Response, path: &Path) -> Result<u64> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut written = 0u64;
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| Error::TransportOffline(format!("download interrupted: {e}")))?
    {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(written)
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().map(OsString::from).unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}

#[async_trait]
impl ViewerApi for HttpViewerApi {
    async fn stats(&self) -> Result<ViewerStats> {
        let response = self
            .client
            .get(self.url("/api/stats"))
            .header("Accept", "application/json")
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|e| Error::TransportOffline(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::TransportOffline(format!(
                "status endpoint answered {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Serialization(format!("failed to parse stats: {e}")))
    }

    async fn verify(&self, code: &str) -> Result<bool> {
        let body: VerifyResponse = self
            .client
            .post(self.url("/api/verify"))
            .json(&VerifyRequest {
                code: code.to_string(),
            })
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|e| Error::TransportOffline(e.to_string()))?
            .json()
            .await
            .map_err(|e| Error::Serialization(format!("failed to parse verify response: {e}")))?;
        Ok(body.success)
    }
}
