//! Clipboard command implementation.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use tokio::sync::mpsc;

use godrop_core::clipboard::access::{ClipboardAccess, NativeClipboard};
use godrop_core::clipboard::{preview, ClipboardHistoryStore, PREVIEW_CHARS};
use godrop_core::poll::PeriodicTask;

use super::{ClipboardAction, ClipboardArgs};

/// Run the clipboard command.
pub async fn run(args: ClipboardArgs) -> Result<()> {
    let mut clipboard = NativeClipboard::new()?;

    match args.action {
        ClipboardAction::Get => {
            println!("{}", clipboard.read_text()?);
        }
        ClipboardAction::Set { text } => {
            clipboard.write_text(&text)?;
            println!("Clipboard updated ({} characters).", text.chars().count());
        }
        ClipboardAction::Watch => watch(clipboard).await?,
    }

    Ok(())
}

async fn watch(clipboard: NativeClipboard) -> Result<()> {
    let config = super::load_config();
    let clipboard = Arc::new(Mutex::new(clipboard));
    let (tx, mut rx) = mpsc::unbounded_channel();

    let poll = PeriodicTask::spawn("clipboard-watch", config.clipboard.poll_interval, tx, {
        let clipboard = Arc::clone(&clipboard);
        move || {
            let clipboard = Arc::clone(&clipboard);
            async move {
                let mut guard = clipboard.lock().ok()?;
                match guard.read_text() {
                    Ok(text) => Some(text),
                    Err(e) => {
                        tracing::warn!(error = %e, "Clipboard read failed");
                        None
                    }
                }
            }
        }
    });

    println!();
    println!("Watching clipboard every {:?}. Press Ctrl+C to stop.", config.clipboard.poll_interval);
    println!();

    let mut history = ClipboardHistoryStore::new();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            text = rx.recv() => {
                let Some(text) = text else { break };
                if history.record(text) {
                    if let Some(head) = history.head() {
                        println!("  [{:>2}] {}", history.len(), preview(head, PREVIEW_CHARS));
                    }
                }
            }
        }
    }

    poll.cancel();
    println!();
    println!("Recorded {} entries.", history.len());
    Ok(())
}
