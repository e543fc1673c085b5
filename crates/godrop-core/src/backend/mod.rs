//! Collaborators the session controller talks to.
//!
//! The transfer service, the host filesystem and the OS clipboard are all
//! reached through the traits in this module. [`local::LocalFilesystem`]
//! provides the filesystem half for hosts where the controller runs next to
//! the files it lists.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::navigator::DirectoryEntry;

pub mod local;

/// Connection details returned by a successful start call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    /// Address other devices should connect to
    pub ip: String,
    /// Port the service actually bound (may differ from the requested one)
    pub port: u16,
    /// Full URL to share, also encoded in the QR code
    pub full_url: String,
    /// QR code reference (a data URL in practice); opaque to the controller
    pub qr_code: String,
}

/// Parameters for starting a send session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendRequest {
    /// Preferred port
    pub port: u16,
    /// Optional password receivers must enter before downloading
    pub password: Option<String>,
    /// Full paths of the files to broadcast
    pub paths: Vec<String>,
    /// Downloads allowed before the service shuts down
    pub download_limit: u32,
    /// Minutes until the link expires (0 for no expiry)
    pub timeout_minutes: u32,
}

/// Source of directory listings.
#[async_trait]
pub trait DirectoryLister: Send + Sync {
    /// List the entries of `path`, in any order.
    ///
    /// # Errors
    ///
    /// Returns an I/O flavoured error if the directory cannot be read.
    async fn read_directory(&self, path: &str) -> Result<Vec<DirectoryEntry>>;
}

/// Everything the session controller needs from the transfer service host.
#[async_trait]
pub trait Backend: DirectoryLister {
    /// The user's home directory.
    async fn home_directory(&self) -> Result<String>;

    /// Where received files go unless the user picks another dropzone.
    async fn default_save_location(&self) -> Result<String>;

    /// Ask the user to pick a directory; `None` when the dialog was cancelled.
    async fn select_directory(&self) -> Result<Option<String>>;

    /// Start broadcasting files.
    async fn start_send_session(&self, request: SendRequest) -> Result<SessionInfo>;

    /// Open a dropzone that saves uploads into `save_location`.
    async fn start_receive_session(&self, port: u16, save_location: &str) -> Result<SessionInfo>;

    /// Start sharing the clipboard.
    async fn start_clipboard_session(&self, port: u16) -> Result<SessionInfo>;

    /// Stop whatever session is running.
    async fn stop_session(&self) -> Result<()>;

    /// Current system clipboard text.
    async fn system_clipboard_text(&self) -> Result<String>;

    /// Replace the system clipboard text.
    async fn set_system_clipboard_text(&self, text: &str) -> Result<()>;

    /// Clipboard history recorded by the service, newest first.
    async fn clipboard_history(&self) -> Result<Vec<String>>;
}
