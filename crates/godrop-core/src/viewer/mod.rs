//! Detached viewer.
//!
//! The viewer is the non-controlling client a receiving device uses: it
//! cannot start or stop anything, it polls the sharing device's status
//! endpoint and performs the download once allowed.
//!
//! - [`gate`] - Code verification, countdown and the download gate
//! - [`runner`] - Periodic status poll and countdown tick
//! - [`http`] - `reqwest` client for the viewer endpoints (feature `viewer`)

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub mod gate;
#[cfg(feature = "viewer")]
pub mod http;
pub mod runner;

pub use gate::{format_countdown, Countdown, SecurityGate, ViewerDisplay};
#[cfg(feature = "viewer")]
pub use http::HttpViewerApi;
pub use runner::run_viewer;

/// Status served by `GET /api/stats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerStats {
    /// Name of the shared file
    pub file_name: String,
    /// Size of the shared file in bytes
    pub file_size: u64,
    /// Downloads allowed; 0 means unlimited
    pub download_limit: u32,
    /// Downloads already served
    pub downloads_used: u32,
    /// Whether a security code is required
    pub has_code: bool,
    /// Unix time the link expires; 0 means never
    pub expiry_epoch_seconds: i64,
}

impl ViewerStats {
    /// Whether the link serves any number of downloads.
    pub fn is_unlimited(&self) -> bool {
        self.download_limit == 0
    }

    /// Downloads left before the link is used up; `None` when unlimited.
    pub fn downloads_remaining(&self) -> Option<u32> {
        (!self.is_unlimited()).then(|| self.download_limit.saturating_sub(self.downloads_used))
    }

    /// Whether every allowed download has been served. Never true for an
    /// unlimited link.
    pub fn exhausted(&self) -> bool {
        !self.is_unlimited() && self.downloads_used >= self.download_limit
    }
}

/// Name used when the advertised file name is unusable.
pub const FALLBACK_DOWNLOAD_NAME: &str = "download";

/// Reduce an advertised file name to a single plain path component.
///
/// Only the last `/` or `\` separated segment is kept. Empty, `.`, `..`
/// and anything that is not a normal component (drive prefixes, roots)
/// become [`FALLBACK_DOWNLOAD_NAME`].
pub fn download_file_name(advertised: &str) -> String {
    let last = advertised
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    let mut components = Path::new(last).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) => name.to_string_lossy().into_owned(),
        _ => {
            tracing::warn!(name = %advertised, "Unusable file name advertised, using fallback");
            FALLBACK_DOWNLOAD_NAME.to_string()
        }
    }
}

/// Where a download of `advertised` lands inside `dir`. Always a direct
/// child of `dir`.
pub fn download_path(dir: &Path, advertised: &str) -> PathBuf {
    dir.join(download_file_name(advertised))
}

/// Body of `POST /api/verify`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyRequest {
    /// Code typed by the user
    pub code: String,
}

/// Answer of `POST /api/verify`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyResponse {
    /// Whether the code matched
    pub success: bool,
}

/// Endpoints the viewer consumes.
#[async_trait]
pub trait ViewerApi: Send + Sync {
    /// Fetch the current status.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::TransportOffline`] when unreachable.
    async fn stats(&self) -> Result<ViewerStats>;

    /// Check a security code. `Ok(false)` means the code was wrong.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::TransportOffline`] when unreachable.
    async fn verify(&self, code: &str) -> Result<bool>;
}

/// State that lives for one browsing session of the viewer.
///
/// A reload starts from [`ViewerSession::default`], so a successful
/// verification is never remembered past it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewerSession {
    unlocked: bool,
}

impl ViewerSession {
    /// Fresh session, locked.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a code was verified in this session.
    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Remember a successful verification.
    pub fn unlock(&mut self) {
        self.unlocked = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_wire_format() {
        let stats: ViewerStats = serde_json::from_str(
            r#"{"fileName":"a.zip","fileSize":2048,"downloadLimit":3,"downloadsUsed":1,"hasCode":true,"expiryEpochSeconds":0}"#,
        )
        .unwrap();

        assert_eq!(stats.file_name, "a.zip");
        assert_eq!(stats.downloads_remaining(), Some(2));
        assert!(!stats.exhausted());
        assert!(stats.has_code);
    }

    #[test]
    fn test_exhausted_when_used_reaches_limit() {
        let stats = ViewerStats {
            download_limit: 1,
            downloads_used: 1,
            ..ViewerStats::default()
        };
        assert!(stats.exhausted());
        assert_eq!(stats.downloads_remaining(), Some(0));
    }

    #[test]
    fn test_zero_limit_is_unlimited() {
        let mut stats = ViewerStats::default();
        assert!(stats.is_unlimited());
        assert!(!stats.exhausted());
        assert_eq!(stats.downloads_remaining(), None);

        stats.downloads_used = 40;
        assert!(!stats.exhausted());
    }

    #[test]
    fn test_download_file_name_keeps_last_component() {
        assert_eq!(download_file_name("report.pdf"), "report.pdf");
        assert_eq!(download_file_name("/abs/x"), "x");
        assert_eq!(download_file_name("../x"), "x");
        assert_eq!(download_file_name("a/b/c.txt"), "c.txt");
        assert_eq!(download_file_name("..\\..\\evil.bat"), "evil.bat");
    }

    #[test]
    fn test_download_file_name_fallback() {
        for name in ["", "   ", ".", "..", "a/..", "/", "dir/"] {
            assert_eq!(download_file_name(name), FALLBACK_DOWNLOAD_NAME, "{name:?}");
        }
    }

    #[test]
    fn test_download_path_stays_inside_dir() {
        let dir = Path::new("/home/u/Downloads");
        for name in ["/home/u/.bashrc", "../.ssh/authorized_keys", "a/b/c.txt", ".."] {
            let dest = download_path(dir, name);
            assert_eq!(dest.parent(), Some(dir), "{name:?}");
        }
        assert_eq!(
            download_path(dir, "/home/u/.bashrc"),
            dir.join(".bashrc")
        );
    }

    #[test]
    fn test_reload_forgets_unlock() {
        let mut session = ViewerSession::new();
        session.unlock();
        assert!(session.is_unlocked());
        assert!(!ViewerSession::default().is_unlocked());
    }
}
