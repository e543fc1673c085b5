//! The session state machine.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};

use super::{
    ReceivedFileRecord, SessionConfig, SessionMode, SessionSnapshot, SessionStatus,
};
use crate::backend::{Backend, SendRequest, SessionInfo};
use crate::clipboard::ClipboardHistoryStore;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::events::{BackendEvent, ProgressSnapshot};
use crate::navigator::{DirectoryEntry, PathNavigator};
use crate::poll::PeriodicTask;
use crate::selection::SelectionSet;

const CLIPBOARD_POLL_TASK: &str = "clipboard-poll";

/// Client-side owner of the session lifecycle and everything the user sees.
///
/// All mutation goes through `&mut self`, so a single task (see
/// [`super::drive`]) serializes user commands, backend events and clipboard
/// polls. Every change is published as a [`SessionSnapshot`] on a
/// `tokio::sync::watch` channel.
pub struct SessionController<B: Backend + 'static> {
    backend: Arc<B>,
    poll_interval: Duration,
    start_dir: Option<String>,
    save_location_override: Option<String>,

    navigator: PathNavigator,
    selection: SelectionSet,
    history: ClipboardHistoryStore,
    clipboard_draft: String,
    save_location: String,

    mode: SessionMode,
    status: SessionStatus,
    info: Option<SessionInfo>,
    progress: Option<ProgressSnapshot>,
    logs: Vec<String>,
    received: Vec<ReceivedFileRecord>,

    clipboard_poll: Option<PeriodicTask>,
    poll_tx: mpsc::UnboundedSender<String>,
    poll_rx: Option<mpsc::UnboundedReceiver<String>>,
    state_tx: watch::Sender<SessionSnapshot>,
}

impl<B: Backend + 'static> SessionController<B> {
    /// Create an idle controller in send mode.
    pub fn new(backend: Arc<B>) -> Self {
        let (poll_tx, poll_rx) = mpsc::unbounded_channel();
        let (state_tx, _) = watch::channel(SessionSnapshot::default());

        Self {
            backend,
            poll_interval: Config::default().clipboard.poll_interval,
            start_dir: None,
            save_location_override: None,
            navigator: PathNavigator::new(),
            selection: SelectionSet::new(),
            history: ClipboardHistoryStore::new(),
            clipboard_draft: String::new(),
            save_location: String::new(),
            mode: SessionMode::default(),
            status: SessionStatus::Idle,
            info: None,
            progress: None,
            logs: Vec::new(),
            received: Vec::new(),
            clipboard_poll: None,
            poll_tx,
            poll_rx: Some(poll_rx),
            state_tx,
        }
    }

    /// Create a controller using the poll interval, start directory and
    /// dropzone from `config`.
    pub fn with_config(backend: Arc<B>, config: &Config) -> Self {
        let mut controller = Self::new(backend);
        controller.poll_interval = config.clipboard.poll_interval;
        controller.start_dir = config
            .browser
            .start_dir
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned());
        controller.save_location_override = config
            .session
            .save_location
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned());
        controller
    }

    /// Override the clipboard poll period.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Load the initial listing, the default dropzone and the clipboard
    /// history. Failures are logged and leave the affected part empty.
    pub async fn bootstrap(&mut self) {
        let start_dir = match self.start_dir.clone() {
            Some(dir) => Some(dir),
            None => match self.backend.home_directory().await {
                Ok(home) => Some(home),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to resolve home directory");
                    self.log(format!("Error loading dir: {e}"));
                    None
                }
            },
        };
        if let Some(dir) = start_dir {
            self.load(&dir).await;
        }

        if let Some(location) = self.save_location_override.clone() {
            self.save_location = location;
        } else {
            match self.backend.default_save_location().await {
                Ok(location) => self.save_location = location,
                Err(e) => tracing::warn!(error = %e, "Failed to resolve default save location"),
            }
        }

        match self.backend.clipboard_history().await {
            Ok(entries) => self.history.seed(entries),
            Err(e) => tracing::warn!(error = %e, "Failed to load clipboard history"),
        }

        self.sync_clipboard_poll();
        self.publish();
    }

    // Mode and lifecycle

    /// Switch mode. Only allowed while idle.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionActive`] when a session is active.
    pub fn set_mode(&mut self, mode: SessionMode) -> Result<()> {
        if self.status.is_active() {
            return Err(Error::SessionActive);
        }
        if self.mode != mode {
            tracing::debug!(from = %self.mode, to = %mode, "Switching mode");
            self.mode = mode;
            self.sync_clipboard_poll();
            self.publish();
        }
        Ok(())
    }

    /// Whether the start action is enabled.
    pub fn can_start(&self) -> bool {
        self.status == SessionStatus::Idle
            && (self.mode != SessionMode::Send || !self.selection.is_empty())
    }

    /// Start a session in `mode`.
    ///
    /// Calls exactly one backend start primitive unless the request is
    /// rejected up front. Every outcome is written to the session log.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionActive`], [`Error::TransportUnavailable`] or
    /// [`Error::SelectionEmpty`] when rejected, leaving the status untouched,
    /// or the backend's error when the start call fails, after which the
    /// controller is idle again.
    pub async fn start(&mut self, mode: SessionMode, config: &SessionConfig) -> Result<SessionInfo> {
        if let Err(e) = self.check_start(mode, config) {
            tracing::warn!(%mode, error = %e, "Start rejected");
            self.log(format!("START REJECTED: {e}"));
            self.publish();
            return Err(e);
        }

        self.mode = mode;
        self.status = SessionStatus::Starting;
        self.sync_clipboard_poll();
        self.logs = vec![format!("INITIALIZING {}...", mode.label())];
        self.received.clear();
        self.progress = None;
        self.publish();

        tracing::info!(%mode, port = config.port, "Starting session");
        let (result, started) = match mode {
            SessionMode::Send => {
                let request = SendRequest {
                    port: config.port,
                    password: config.password.clone().filter(|p| !p.is_empty()),
                    paths: self.selection.paths().to_vec(),
                    download_limit: config.download_limit,
                    timeout_minutes: config.timeout_minutes,
                };
                let count = request.paths.len();
                (
                    self.backend.start_send_session(request).await,
                    format!("BROADCASTING {count} FILES"),
                )
            }
            SessionMode::Receive => {
                let location = config
                    .save_location
                    .clone()
                    .unwrap_or_else(|| self.save_location.clone());
                let result = if location.is_empty() {
                    Err(Error::Startup("no save location chosen".to_string()))
                } else {
                    self.backend.start_receive_session(config.port, &location).await
                };
                (result, format!("DROPZONE ACTIVE -> {location}"))
            }
            SessionMode::ClipboardSync => (
                self.backend.start_clipboard_session(config.port).await,
                "CLIPBOARD SYNC ACTIVE".to_string(),
            ),
        };

        match result {
            Ok(info) => {
                tracing::info!(%mode, url = %info.full_url, "Session running");
                self.log(started);
                self.info = Some(info.clone());
                self.status = SessionStatus::Running;
                self.publish();
                Ok(info)
            }
            Err(e) => {
                tracing::warn!(%mode, error = %e, "Session startup failed");
                self.log(format!("STARTUP FAILED: {e}"));
                self.status = SessionStatus::Idle;
                self.sync_clipboard_poll();
                self.publish();
                Err(e)
            }
        }
    }

    fn check_start(&self, mode: SessionMode, config: &SessionConfig) -> Result<()> {
        if self.status.is_active() {
            return Err(Error::SessionActive);
        }
        if !config.connectivity.is_available() {
            return Err(Error::TransportUnavailable(config.connectivity.to_string()));
        }
        if mode == SessionMode::Send && self.selection.is_empty() {
            return Err(Error::SelectionEmpty);
        }
        Ok(())
    }

    /// Stop the running session.
    ///
    /// Session state is cleared and the controller returns to idle whatever
    /// the backend answers; its error, if any, is handed back afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoSessionActive`] when idle, or the backend's stop
    /// error.
    pub async fn stop(&mut self) -> Result<()> {
        if !self.status.is_active() {
            return Err(Error::NoSessionActive);
        }

        self.status = SessionStatus::Stopping;
        self.publish();

        let result = self.backend.stop_session().await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, "Backend failed to stop session");
            self.log(format!("ERROR: {e}"));
        }
        self.log("Server stopped.");
        self.end_session();
        result
    }

    fn end_session(&mut self) {
        tracing::info!(mode = %self.mode, "Session ended");
        self.info = None;
        self.progress = None;
        self.received.clear();
        self.status = SessionStatus::Idle;
        self.sync_clipboard_poll();
        self.publish();
    }

    // Backend events

    /// Apply one backend event.
    ///
    /// Session-scoped events that arrive while idle belong to a session that
    /// has already been cleaned up and are ignored.
    pub fn handle_event(&mut self, event: BackendEvent) {
        match event {
            BackendEvent::ClipboardChanged { text } => {
                if self.history.record(text) {
                    self.publish();
                }
            }
            event if self.status == SessionStatus::Idle => {
                tracing::debug!(kind = event.kind(), "Ignoring event while idle");
            }
            BackendEvent::SessionStarted { peer_address } => {
                self.log(format!("Download started from {peer_address}"));
                self.publish();
            }
            BackendEvent::FileReceived { name } => {
                if self.received.iter().any(|r| r.name == name) {
                    tracing::debug!(%name, "Duplicate file notification");
                    return;
                }
                tracing::info!(%name, "File received");
                self.log(format!("RECEIVED: {name}"));
                self.received.push(ReceivedFileRecord::saved(name));
                self.publish();
            }
            BackendEvent::SessionError { message } => {
                tracing::warn!(%message, "Session error reported by backend");
                self.log(format!("ERROR: {message}"));
                self.end_session();
            }
            BackendEvent::SessionStopped => {
                self.log("Server stopped.");
                self.end_session();
            }
            BackendEvent::TransferProgress(snapshot) => {
                if let Some(previous) = &self.progress {
                    if !snapshot.advances(previous) {
                        tracing::debug!(?snapshot, ?previous, "Ignoring progress regression");
                        return;
                    }
                }
                self.progress = Some(snapshot);
                self.publish();
            }
        }
    }

    // Browsing and selection

    /// List `path` and make it the current directory.
    ///
    /// Returns `false` when listing failed; the failure is written to the
    /// session log and the previous listing stays.
    pub async fn open_directory(&mut self, path: &str) -> bool {
        let ok = self.load(path).await;
        self.publish();
        ok
    }

    /// Enter `entry` when it is a directory.
    pub async fn navigate_into(&mut self, entry: &DirectoryEntry) -> bool {
        if !entry.is_directory() {
            return false;
        }
        self.open_directory(&entry.full_path).await
    }

    /// Go to the parent of the current directory.
    pub async fn navigate_up(&mut self) -> bool {
        let parent = crate::navigator::parent_path(self.navigator.current_path());
        self.open_directory(&parent).await
    }

    async fn load(&mut self, path: &str) -> bool {
        match self
            .navigator
            .load_directory(self.backend.as_ref(), path)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                self.log(format!("Error loading dir: {e}"));
                false
            }
        }
    }

    /// Toggle `entry` in the send selection. Directories are ignored.
    pub fn toggle_selection(&mut self, entry: &DirectoryEntry) -> bool {
        let selected = self.selection.toggle(entry);
        self.publish();
        selected
    }

    /// Drop `path` from the send selection.
    pub fn remove_selection(&mut self, path: &str) -> bool {
        let removed = self.selection.remove(path);
        if removed {
            self.publish();
        }
        removed
    }

    /// Ask the user for a new dropzone. Cancelling keeps the current one.
    pub async fn choose_save_location(&mut self) -> bool {
        match self.backend.select_directory().await {
            Ok(Some(path)) => {
                tracing::info!(%path, "Save location changed");
                self.save_location = path;
                self.publish();
                true
            }
            Ok(None) => false,
            Err(e) => {
                tracing::warn!(error = %e, "Directory picker failed");
                self.log(format!("ERROR: {e}"));
                self.publish();
                false
            }
        }
    }

    // Clipboard

    /// Replace the clipboard text being edited.
    pub fn set_clipboard_draft(&mut self, text: impl Into<String>) {
        self.clipboard_draft = text.into();
        self.publish();
    }

    /// Write the draft to the system clipboard and record it in the history.
    ///
    /// # Errors
    ///
    /// Returns the backend's clipboard error; the history is left unchanged.
    pub async fn push_clipboard(&mut self) -> Result<()> {
        let text = self.clipboard_draft.clone();
        self.history
            .copy_to_system(self.backend.as_ref(), &text)
            .await?;
        if self.history.record(text) {
            self.publish();
        }
        Ok(())
    }

    /// Put history entry `index` on the system clipboard and into the draft.
    ///
    /// Returns `Ok(false)` when there is no such entry.
    ///
    /// # Errors
    ///
    /// Returns the backend's clipboard error.
    pub async fn copy_history_entry(&mut self, index: usize) -> Result<bool> {
        let Some(text) = self.history.get(index).map(str::to_string) else {
            return Ok(false);
        };
        self.history
            .copy_to_system(self.backend.as_ref(), &text)
            .await?;
        self.clipboard_draft = text;
        self.publish();
        Ok(true)
    }

    /// Apply a clipboard poll result. Ignored unless the poll is armed.
    pub fn apply_clipboard_poll(&mut self, text: String) {
        if !self.clipboard_poll_armed() {
            tracing::debug!("Dropping stale clipboard poll result");
            return;
        }
        let changed = self.clipboard_draft != text;
        if changed {
            self.clipboard_draft.clone_from(&text);
        }
        if self.history.record(text) || changed {
            self.publish();
        }
    }

    /// Receiver for clipboard poll results. Available once.
    pub fn take_clipboard_polls(&mut self) -> Option<mpsc::UnboundedReceiver<String>> {
        self.poll_rx.take()
    }

    /// Whether a clipboard poll task is currently running.
    pub fn clipboard_poll_active(&self) -> bool {
        self.clipboard_poll
            .as_ref()
            .is_some_and(PeriodicTask::is_active)
    }

    fn clipboard_poll_armed(&self) -> bool {
        self.mode == SessionMode::ClipboardSync && self.status == SessionStatus::Idle
    }

    fn sync_clipboard_poll(&mut self) {
        let wanted = self.clipboard_poll_armed();
        if wanted && self.clipboard_poll_active() {
            return;
        }

        if let Some(task) = self.clipboard_poll.take() {
            task.cancel();
        }

        if wanted {
            let backend = Arc::clone(&self.backend);
            self.clipboard_poll = Some(PeriodicTask::spawn(
                CLIPBOARD_POLL_TASK,
                self.poll_interval,
                self.poll_tx.clone(),
                move || {
                    let backend = Arc::clone(&backend);
                    async move {
                        match backend.system_clipboard_text().await {
                            Ok(text) => Some(text),
                            Err(e) => {
                                tracing::warn!(error = %e, "Clipboard poll failed");
                                None
                            }
                        }
                    }
                },
            ));
        }
    }

    // Observation

    fn log(&mut self, message: impl AsRef<str>) {
        self.logs.push(format!("> {}", message.as_ref()));
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.snapshot());
    }

    /// Current state as a value.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            mode: self.mode,
            status: self.status,
            info: self.info.clone(),
            progress: self.progress,
            logs: self.logs.clone(),
            received: self.received.clone(),
            current_path: self.navigator.current_path().to_string(),
            selection: self.selection.paths().to_vec(),
            save_location: self.save_location.clone(),
            clipboard_draft: self.clipboard_draft.clone(),
            clipboard_history: self.history.to_vec(),
            can_start: self.can_start(),
        }
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state_tx.subscribe()
    }

    /// Selected mode.
    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Lifecycle state.
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Connection details while running.
    pub fn info(&self) -> Option<&SessionInfo> {
        self.info.as_ref()
    }

    /// Latest transfer progress while running.
    pub fn progress(&self) -> Option<&ProgressSnapshot> {
        self.progress.as_ref()
    }

    /// Session log.
    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    /// Files received in the current session.
    pub fn received_files(&self) -> &[ReceivedFileRecord] {
        &self.received
    }

    /// Directory browser.
    pub fn navigator(&self) -> &PathNavigator {
        &self.navigator
    }

    /// Send selection.
    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    /// Clipboard history.
    pub fn clipboard_history(&self) -> &ClipboardHistoryStore {
        &self.history
    }

    /// Clipboard text being edited.
    pub fn clipboard_draft(&self) -> &str {
        &self.clipboard_draft
    }

    /// Dropzone used by receive sessions.
    pub fn save_location(&self) -> &str {
        &self.save_location
    }
}
