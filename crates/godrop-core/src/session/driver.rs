//! The task that owns a [`SessionController`].

use tokio::sync::mpsc;

use super::{SessionConfig, SessionController, SessionMode};
use crate::backend::Backend;
use crate::events::EventBridge;
use crate::navigator::DirectoryEntry;

/// A user action forwarded to the controller.
#[derive(Debug, Clone)]
pub enum ControllerCommand {
    /// Switch mode (idle only)
    SetMode(SessionMode),
    /// Start a session
    Start {
        /// Session mode
        mode: SessionMode,
        /// Start options
        config: SessionConfig,
    },
    /// Stop the running session
    Stop,
    /// List a directory
    OpenDirectory(String),
    /// Enter a listed directory
    NavigateInto(DirectoryEntry),
    /// Go to the parent directory
    NavigateUp,
    /// Toggle a file in the send selection
    ToggleSelection(DirectoryEntry),
    /// Remove a path from the send selection
    RemoveSelection(String),
    /// Pick a new dropzone interactively
    ChooseSaveLocation,
    /// Replace the clipboard draft
    SetClipboardDraft(String),
    /// Push the clipboard draft to the system clipboard
    PushClipboard,
    /// Copy a history entry to the system clipboard
    CopyHistoryEntry(usize),
    /// Stop driving; a running session is stopped first
    Shutdown,
}

/// Run `controller` until a [`ControllerCommand::Shutdown`] arrives or the
/// command channel closes, then hand it back.
///
/// Commands, backend events and clipboard poll results are applied one at a
/// time, each source in arrival order.
pub async fn drive<B: Backend + 'static>(
    mut controller: SessionController<B>,
    mut commands: mpsc::UnboundedReceiver<ControllerCommand>,
    mut bridge: EventBridge,
) -> SessionController<B> {
    let mut polls = controller.take_clipboard_polls();

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(ControllerCommand::Shutdown) | None => break,
                Some(command) => execute(&mut controller, command).await,
            },
            Some(event) = bridge.recv() => controller.handle_event(event),
            Some(text) = next_poll(&mut polls) => controller.apply_clipboard_poll(text),
        }
    }

    if controller.status().is_active() {
        if let Err(e) = controller.stop().await {
            tracing::warn!(error = %e, "Failed to stop session on shutdown");
        }
    }
    tracing::debug!("Session driver stopped");
    controller
}

async fn next_poll(polls: &mut Option<mpsc::UnboundedReceiver<String>>) -> Option<String> {
    match polls {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn execute<B: Backend + 'static>(
    controller: &mut SessionController<B>,
    command: ControllerCommand,
) {
    match command {
        ControllerCommand::SetMode(mode) => {
            if let Err(e) = controller.set_mode(mode) {
                tracing::warn!(%mode, error = %e, "Mode change rejected");
            }
        }
        ControllerCommand::Start { mode, config } => {
            // outcome is in the session log
            let _ = controller.start(mode, &config).await;
        }
        ControllerCommand::Stop => {
            if let Err(e) = controller.stop().await {
                tracing::debug!(error = %e, "Stop finished with error");
            }
        }
        ControllerCommand::OpenDirectory(path) => {
            controller.open_directory(&path).await;
        }
        ControllerCommand::NavigateInto(entry) => {
            controller.navigate_into(&entry).await;
        }
        ControllerCommand::NavigateUp => {
            controller.navigate_up().await;
        }
        ControllerCommand::ToggleSelection(entry) => {
            controller.toggle_selection(&entry);
        }
        ControllerCommand::RemoveSelection(path) => {
            controller.remove_selection(&path);
        }
        ControllerCommand::ChooseSaveLocation => {
            controller.choose_save_location().await;
        }
        ControllerCommand::SetClipboardDraft(text) => controller.set_clipboard_draft(text),
        ControllerCommand::PushClipboard => {
            if let Err(e) = controller.push_clipboard().await {
                tracing::warn!(error = %e, "Failed to write clipboard");
            }
        }
        ControllerCommand::CopyHistoryEntry(index) => {
            if let Err(e) = controller.copy_history_entry(index).await {
                tracing::warn!(index, error = %e, "Failed to copy history entry");
            }
        }
        ControllerCommand::Shutdown => {}
    }
}
