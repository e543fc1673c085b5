//! Session lifecycle.
//!
//! A session is one run of the transfer service in exactly one
//! [`SessionMode`], from a successful start to a stop, error or expiry.
//! [`SessionController`] owns the lifecycle; [`drive`] runs it as the single
//! task that feeds it user commands, backend events and clipboard polls.
//!
//! ```text
//! Idle -> Starting -> Running -> Stopping -> Idle
//!            |
//!            +-> Idle (startup failure)
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::backend::SessionInfo;
use crate::config::Config;
use crate::events::ProgressSnapshot;

mod controller;
mod driver;

pub use controller::SessionController;
pub use driver::{drive, ControllerCommand};

/// What a session does. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    /// Broadcast the selected files
    #[default]
    Send,
    /// Open a dropzone for incoming files
    Receive,
    /// Share clipboard text
    ClipboardSync,
}

impl SessionMode {
    /// Upper-case label used in session logs.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Send => "SEND",
            Self::Receive => "RECEIVE",
            Self::ClipboardSync => "CLIPBOARD",
        }
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle state of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// No session
    #[default]
    Idle,
    /// Waiting for the backend to confirm a start
    Starting,
    /// Session confirmed by the backend
    Running,
    /// Waiting for the backend to confirm a stop
    Stopping,
}

impl SessionStatus {
    /// Whether a session is starting, running or stopping.
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// How peers reach the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    /// Same local network
    #[default]
    Local,
    /// Over the internet; announced in the UI but not available
    Internet,
}

impl Connectivity {
    /// Whether sessions can be started with this option.
    pub const fn is_available(self) -> bool {
        matches!(self, Self::Local)
    }
}

impl fmt::Display for Connectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Internet => f.write_str("internet"),
        }
    }
}

/// Options for a single start call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Preferred port
    pub port: u16,
    /// Password receivers must enter (send mode only)
    pub password: Option<String>,
    /// Downloads allowed before the service shuts down (send mode only)
    pub download_limit: u32,
    /// Minutes until the link expires, 0 for never (send mode only)
    pub timeout_minutes: u32,
    /// Dropzone override; the controller's save location is used when unset
    pub save_location: Option<String>,
    /// Reachability option
    pub connectivity: Connectivity,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            port: crate::DEFAULT_PORT,
            password: None,
            download_limit: crate::DEFAULT_DOWNLOAD_LIMIT,
            timeout_minutes: crate::DEFAULT_TIMEOUT_MINUTES,
            save_location: None,
            connectivity: Connectivity::Local,
        }
    }
}

impl From<&Config> for SessionConfig {
    fn from(config: &Config) -> Self {
        Self {
            port: config.session.port,
            password: None,
            download_limit: config.session.download_limit,
            timeout_minutes: config.session.timeout_minutes,
            save_location: config
                .session
                .save_location
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned()),
            connectivity: Connectivity::Local,
        }
    }
}

/// Outcome of an incoming file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiveStatus {
    /// Saved into the dropzone
    Saved,
}

impl fmt::Display for ReceiveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Saved => f.write_str("SAVED"),
        }
    }
}

/// A file that arrived during a receive session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceivedFileRecord {
    /// File name; unique within a session
    pub name: String,
    /// When the arrival was reported
    pub timestamp: DateTime<Utc>,
    /// Outcome
    pub status: ReceiveStatus,
}

impl ReceivedFileRecord {
    /// Record a file reported now.
    pub fn saved(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            timestamp: Utc::now(),
            status: ReceiveStatus::Saved,
        }
    }
}

/// Everything the presentation layer renders, published after each change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    /// Selected mode
    pub mode: SessionMode,
    /// Lifecycle state
    pub status: SessionStatus,
    /// Connection details while running
    pub info: Option<SessionInfo>,
    /// Latest transfer progress while running
    pub progress: Option<ProgressSnapshot>,
    /// Session log, one line per entry
    pub logs: Vec<String>,
    /// Files received in the current session
    pub received: Vec<ReceivedFileRecord>,
    /// Directory being browsed
    pub current_path: String,
    /// Selected file paths, in selection order
    pub selection: Vec<String>,
    /// Dropzone used by receive sessions
    pub save_location: String,
    /// Clipboard text being edited
    pub clipboard_draft: String,
    /// Clipboard history, newest first
    pub clipboard_history: Vec<String>,
    /// Whether the start action is enabled
    pub can_start: bool,
}
