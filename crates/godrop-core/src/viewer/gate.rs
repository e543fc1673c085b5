//! Download gate of the detached viewer.
//!
//! [`SecurityGate`] combines the last polled [`ViewerStats`], the online
//! flag, the countdown and the [`ViewerSession`] into one decision: may the
//! download action be used right now.

use serde::Serialize;

use super::{ViewerApi, ViewerSession, ViewerStats};
use crate::error::{Error, Result};
use crate::navigator::format_size;

const LABEL_UNBOUNDED: &str = "INFINITY";
const LABEL_EXPIRED: &str = "SHUTTING DOWN...";
const LABEL_BLANK: &str = "00:00:00";
const LABEL_OFFLINE: &str = "SYSTEM_OFFLINE";
const LABEL_LINK_EXPIRED: &str = "LINK_EXPIRED";
const LABEL_TIMEOUT: &str = "TIMEOUT";
const LABEL_ONLINE: &str = "ONLINE";
const LABEL_DOWNLOAD: &str = "DOWNLOAD";
const PROMPT_CODE: &str = "ENTER_SECURITY_CODE";
const PROMPT_RETRY: &str = "INVALID_CODE_TRY_AGAIN...";

/// Time left on the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "seconds", rename_all = "snake_case")]
pub enum Countdown {
    /// The link never expires
    Unbounded,
    /// Seconds left
    Remaining(u64),
    /// The link has expired
    Expired,
    /// Nothing to show (no status yet, or offline)
    #[default]
    Blank,
}

impl Countdown {
    /// Compute the countdown for `expiry_epoch_seconds` at `now_epoch`.
    pub fn at(expiry_epoch_seconds: i64, now_epoch: i64) -> Self {
        if expiry_epoch_seconds == 0 {
            return Self::Unbounded;
        }
        let remaining = expiry_epoch_seconds.saturating_sub(now_epoch);
        match u64::try_from(remaining) {
            Ok(secs) if secs > 0 => Self::Remaining(secs),
            _ => Self::Expired,
        }
    }

    /// Text shown in the timer slot.
    pub fn label(&self) -> String {
        match self {
            Self::Unbounded => LABEL_UNBOUNDED.to_string(),
            Self::Remaining(secs) => format_countdown(*secs),
            Self::Expired => LABEL_EXPIRED.to_string(),
            Self::Blank => LABEL_BLANK.to_string(),
        }
    }
}

/// Format seconds as `HH:MM:SS`. Hours are not wrapped.
pub fn format_countdown(seconds: u64) -> String {
    let h = seconds / 3600;
    let m = (seconds % 3600) / 60;
    let s = seconds % 60;
    format!("{h:02}:{m:02}:{s:02}")
}

/// Everything the viewer renders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewerDisplay {
    /// Whether the last status poll succeeded
    pub online: bool,
    /// Status badge text
    pub badge: String,
    /// Shared file name
    pub file_name: String,
    /// Shared file size, human readable
    pub file_size: String,
    /// Downloads left; `None` for an unlimited link
    pub downloads_remaining: Option<u32>,
    /// Downloads allowed; 0 for an unlimited link
    pub downloads_total: u32,
    /// Countdown state
    pub countdown: Countdown,
    /// Countdown text
    pub time_left: String,
    /// Whether the code prompt is shown
    pub show_code_prompt: bool,
    /// Placeholder of the code input
    pub code_placeholder: String,
    /// Current content of the code input
    pub code_input: String,
    /// Whether the download action is enabled
    pub download_enabled: bool,
    /// Download action label
    pub download_label: String,
}

impl ViewerDisplay {
    /// Whether `other` differs from `self` only in the countdown.
    pub fn only_countdown_differs(&self, other: &Self) -> bool {
        let strip = |d: &Self| Self {
            countdown: Countdown::Blank,
            time_left: String::new(),
            ..d.clone()
        };
        self != other && strip(self) == strip(other)
    }
}

/// Gate in front of the download action.
pub struct SecurityGate<A: ViewerApi> {
    api: A,
    session: ViewerSession,
    stats: Option<ViewerStats>,
    online: bool,
    countdown: Countdown,
    code_input: String,
    code_rejected: bool,
}

impl<A: ViewerApi> SecurityGate<A> {
    /// Create a gate for a fresh browsing session.
    pub fn new(api: A) -> Self {
        Self::with_session(api, ViewerSession::default())
    }

    /// Create a gate continuing `session`.
    pub fn with_session(api: A, session: ViewerSession) -> Self {
        Self {
            api,
            session,
            stats: None,
            online: false,
            countdown: Countdown::Blank,
            code_input: String::new(),
            code_rejected: false,
        }
    }

    /// The endpoint client.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Browsing session state.
    pub fn session(&self) -> ViewerSession {
        self.session
    }

    /// Last polled status.
    pub fn stats(&self) -> Option<&ViewerStats> {
        self.stats.as_ref()
    }

    /// Whether the last status poll succeeded.
    pub fn is_online(&self) -> bool {
        self.online
    }

    /// Current countdown.
    pub fn countdown(&self) -> Countdown {
        self.countdown
    }

    /// Poll the status endpoint and recompute the countdown for `now_epoch`.
    ///
    /// A failed poll marks the gate offline and blanks the countdown; the
    /// last known stats are kept for the next successful poll to replace.
    ///
    /// # Errors
    ///
    /// Returns the transport error of a failed poll.
    pub async fn refresh(&mut self, now_epoch: i64) -> Result<()> {
        match self.api.stats().await {
            Ok(stats) => {
                if !self.online {
                    tracing::info!(file = %stats.file_name, "Viewer online");
                }
                self.stats = Some(stats);
                self.online = true;
                self.tick(now_epoch);
                Ok(())
            }
            Err(e) => {
                if self.online {
                    tracing::warn!(error = %e, "Viewer went offline");
                }
                self.online = false;
                self.countdown = Countdown::Blank;
                Err(e)
            }
        }
    }

    /// Recompute the countdown for `now_epoch`. Stays blank while offline.
    pub fn tick(&mut self, now_epoch: i64) -> Countdown {
        self.countdown = match (&self.stats, self.online) {
            (Some(stats), true) => Countdown::at(stats.expiry_epoch_seconds, now_epoch),
            _ => Countdown::Blank,
        };
        self.countdown
    }

    /// Replace the text in the code input.
    pub fn set_code_input(&mut self, code: impl Into<String>) {
        self.code_input = code.into();
    }

    /// Submit `code` with a single verify request.
    ///
    /// Success unlocks the download for the rest of the browsing session.
    /// Failure clears the input and shows the retry prompt; there is no
    /// attempt limit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::VerificationFailed`] for a wrong code, or the
    /// transport error when the request fails.
    // TODO: decide on an attempt limit or backoff for wrong codes
    pub async fn verify(&mut self, code: &str) -> Result<()> {
        if self.session.is_unlocked() {
            return Ok(());
        }

        let accepted = self.api.verify(code).await?;
        self.code_input.clear();
        if accepted {
            tracing::info!("Security code accepted");
            self.session.unlock();
            self.code_rejected = false;
            Ok(())
        } else {
            tracing::debug!("Security code rejected");
            self.code_rejected = true;
            Err(Error::VerificationFailed)
        }
    }

    /// Whether the code prompt should be shown.
    pub fn code_prompt_visible(&self) -> bool {
        self.stats.as_ref().is_some_and(|s| s.has_code) && !self.session.is_unlocked()
    }

    /// Why the download action is disabled, if it is.
    pub fn download_blocker(&self) -> Option<&'static str> {
        let Some(stats) = self.stats.as_ref().filter(|_| self.online) else {
            return Some(LABEL_OFFLINE);
        };
        if stats.exhausted() {
            return Some(LABEL_LINK_EXPIRED);
        }
        if self.countdown == Countdown::Expired {
            return Some(LABEL_TIMEOUT);
        }
        if self.code_prompt_visible() {
            return Some(PROMPT_CODE);
        }
        None
    }

    /// Whether the download action is enabled.
    pub fn download_enabled(&self) -> bool {
        self.download_blocker().is_none()
    }

    /// Check the gate before downloading.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DownloadRefused`] naming the blocker.
    pub fn ensure_download_allowed(&self) -> Result<()> {
        match self.download_blocker() {
            None => Ok(()),
            Some(reason) => Err(Error::DownloadRefused(reason.to_string())),
        }
    }

    /// Render the current state.
    pub fn display(&self) -> ViewerDisplay {
        let stats = self.stats.clone().unwrap_or_default();
        let badge = if !self.online {
            LABEL_OFFLINE
        } else if stats.exhausted() {
            LABEL_LINK_EXPIRED
        } else {
            LABEL_ONLINE
        };
        let download_label = match self.download_blocker() {
            Some(LABEL_LINK_EXPIRED) => LABEL_LINK_EXPIRED,
            Some(LABEL_TIMEOUT) => LABEL_TIMEOUT,
            _ => LABEL_DOWNLOAD,
        };

        ViewerDisplay {
            online: self.online,
            badge: badge.to_string(),
            file_name: stats.file_name.clone(),
            file_size: format_size(stats.file_size),
            downloads_remaining: stats.downloads_remaining(),
            downloads_total: stats.download_limit,
            countdown: self.countdown,
            time_left: self.countdown.label(),
            show_code_prompt: self.code_prompt_visible(),
            code_placeholder: if self.code_rejected {
                PROMPT_RETRY
            } else {
                PROMPT_CODE
            }
            .to_string(),
            code_input: self.code_input.clone(),
            download_enabled: self.download_enabled(),
            download_label: download_label.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    struct StubApi {
        stats: Arc<Mutex<Option<ViewerStats>>>,
        code: &'static str,
    }

    impl StubApi {
        fn new(stats: ViewerStats, code: &'static str) -> Self {
            Self {
                stats: Arc::new(Mutex::new(Some(stats))),
                code,
            }
        }

        fn go_offline(&self) {
            *self.stats.lock().unwrap() = None;
        }
    }

    #[async_trait]
    impl ViewerApi for StubApi {
        async fn stats(&self) -> Result<ViewerStats> {
            self.stats
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| Error::TransportOffline("connection refused".to_string()))
        }

        async fn verify(&self, code: &str) -> Result<bool> {
            Ok(code == self.code)
        }
    }

    fn stats(expiry: i64, has_code: bool) -> ViewerStats {
        ViewerStats {
            file_name: "report.pdf".to_string(),
            file_size: 2048,
            download_limit: 3,
            downloads_used: 0,
            has_code,
            expiry_epoch_seconds: expiry,
        }
    }

    const NOW: i64 = 1_700_000_000;

    #[tokio::test]
    async fn test_countdown_reaches_expired() {
        let mut gate = SecurityGate::new(StubApi::new(stats(NOW + 5, false), "1234"));
        gate.refresh(NOW).await.unwrap();

        assert_eq!(gate.countdown(), Countdown::Remaining(5));
        assert!(gate.download_enabled());

        for elapsed in 1..5 {
            assert_eq!(gate.tick(NOW + elapsed), Countdown::Remaining(5 - elapsed as u64));
        }
        assert_eq!(gate.tick(NOW + 5), Countdown::Expired);
        assert!(!gate.download_enabled());

        let display = gate.display();
        assert_eq!(display.time_left, "SHUTTING DOWN...");
        assert_eq!(display.download_label, "TIMEOUT");
        assert!(gate.ensure_download_allowed().is_err());
    }

    #[tokio::test]
    async fn test_zero_expiry_is_unbounded() {
        let mut gate = SecurityGate::new(StubApi::new(stats(0, false), "1234"));
        gate.refresh(NOW).await.unwrap();

        for elapsed in [0, 60, 86_400, 10_000_000] {
            assert_eq!(gate.tick(NOW + elapsed), Countdown::Unbounded);
        }
        assert_eq!(gate.display().time_left, "INFINITY");
        assert!(gate.download_enabled());
    }

    #[tokio::test]
    async fn test_wrong_then_right_code() {
        let mut gate = SecurityGate::new(StubApi::new(stats(0, true), "right"));
        gate.refresh(NOW).await.unwrap();
        assert!(gate.code_prompt_visible());
        assert!(!gate.download_enabled());

        gate.set_code_input("wrong");
        let err = gate.verify("wrong").await.unwrap_err();
        assert!(matches!(err, Error::VerificationFailed));

        let display = gate.display();
        assert_eq!(display.code_input, "");
        assert_eq!(display.code_placeholder, "INVALID_CODE_TRY_AGAIN...");
        assert!(!display.download_enabled);
        assert!(display.show_code_prompt);

        gate.verify("right").await.unwrap();
        assert!(gate.session().is_unlocked());
        assert!(!gate.code_prompt_visible());
        assert!(gate.download_enabled());

        // later polls keep the unlock
        gate.refresh(NOW + 5).await.unwrap();
        assert!(gate.download_enabled());
        assert!(!gate.display().show_code_prompt);
    }

    #[tokio::test]
    async fn test_unlock_does_not_survive_reload() {
        let api = StubApi::new(stats(0, true), "right");
        let mut gate = SecurityGate::new(api.clone());
        gate.refresh(NOW).await.unwrap();
        gate.verify("right").await.unwrap();

        let mut reloaded = SecurityGate::with_session(api, ViewerSession::default());
        reloaded.refresh(NOW).await.unwrap();
        assert!(reloaded.code_prompt_visible());
        assert!(!reloaded.download_enabled());
    }

    #[tokio::test]
    async fn test_offline_blanks_countdown_and_recovers() {
        let api = StubApi::new(stats(NOW + 120, false), "1234");
        let mut gate = SecurityGate::new(api.clone());
        gate.refresh(NOW).await.unwrap();
        assert_eq!(gate.countdown(), Countdown::Remaining(120));

        api.go_offline();
        assert!(gate.refresh(NOW + 1).await.is_err());
        assert!(!gate.is_online());
        assert_eq!(gate.tick(NOW + 2), Countdown::Blank);

        let display = gate.display();
        assert_eq!(display.badge, "SYSTEM_OFFLINE");
        assert_eq!(display.time_left, "00:00:00");
        assert!(!display.download_enabled);

        *api.stats.lock().unwrap() = Some(stats(NOW + 120, false));
        gate.refresh(NOW + 3).await.unwrap();
        assert_eq!(gate.countdown(), Countdown::Remaining(117));
        assert!(gate.download_enabled());
    }

    #[tokio::test]
    async fn test_exhausted_link() {
        let mut exhausted = stats(0, false);
        exhausted.downloads_used = 3;
        let mut gate = SecurityGate::new(StubApi::new(exhausted, "1234"));
        gate.refresh(NOW).await.unwrap();

        let display = gate.display();
        assert_eq!(display.badge, "LINK_EXPIRED");
        assert_eq!(display.download_label, "LINK_EXPIRED");
        assert!(!display.download_enabled);
    }

    #[tokio::test]
    async fn test_unlimited_link_stays_downloadable() {
        let mut unlimited = stats(0, false);
        unlimited.download_limit = 0;
        unlimited.downloads_used = 7;
        let mut gate = SecurityGate::new(StubApi::new(unlimited, "1234"));
        gate.refresh(NOW).await.unwrap();

        assert_eq!(gate.download_blocker(), None);
        gate.ensure_download_allowed().unwrap();

        let display = gate.display();
        assert_eq!(display.badge, "ONLINE");
        assert_eq!(display.download_label, "DOWNLOAD");
        assert_eq!(display.downloads_remaining, None);
        assert!(display.download_enabled);
    }

    #[tokio::test]
    async fn test_tick_only_changes_countdown() {
        let mut gate = SecurityGate::new(StubApi::new(stats(NOW + 60, false), "1234"));
        gate.refresh(NOW).await.unwrap();
        let before = gate.display();

        gate.tick(NOW + 1);
        let ticked = gate.display();
        assert!(before.only_countdown_differs(&ticked));
        assert!(!ticked.only_countdown_differs(&ticked));

        gate.tick(NOW + 60);
        let expired = gate.display();
        assert!(!ticked.only_countdown_differs(&expired));
    }

    #[test]
    fn test_format_countdown() {
        assert_eq!(format_countdown(5), "00:00:05");
        assert_eq!(format_countdown(3661), "01:01:01");
        assert_eq!(format_countdown(100 * 3600), "100:00:00");
    }
}
