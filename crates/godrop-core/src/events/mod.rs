//! Push notifications from the transfer service.
//!
//! The service emits [`BackendEvent`]s through an [`EventEmitter`]; the
//! controlling shell holds the single [`EventBridge`] and feeds each event to
//! the session controller in emission order. Events emitted while nobody is
//! subscribed are dropped, never replayed.

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Byte counts of the transfer in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    /// Bytes moved so far
    pub transferred_bytes: u64,
    /// Size of the transfer
    pub total_bytes: u64,
    /// Completion, 0-100
    pub percent: u8,
}

impl ProgressSnapshot {
    /// Build a snapshot, deriving the percentage (capped at 100).
    pub fn new(transferred_bytes: u64, total_bytes: u64) -> Self {
        let percent = if total_bytes == 0 {
            100
        } else {
            let ratio = (u128::from(transferred_bytes) * 100) / u128::from(total_bytes);
            u8::try_from(ratio.min(100)).unwrap_or(100)
        };
        Self {
            transferred_bytes,
            total_bytes,
            percent,
        }
    }

    /// Whether `self` does not move backwards relative to `previous`.
    pub fn advances(&self, previous: &Self) -> bool {
        self.transferred_bytes >= previous.transferred_bytes && self.percent >= previous.percent
    }
}

/// A notification pushed by the transfer service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum BackendEvent {
    /// A peer started downloading
    #[serde(rename_all = "camelCase")]
    SessionStarted {
        /// Remote address of the peer
        peer_address: String,
    },
    /// A file landed in the dropzone
    FileReceived {
        /// File name as uploaded
        name: String,
    },
    /// The service hit an error and stopped
    SessionError {
        /// Error detail
        message: String,
    },
    /// The service stopped (expiry, download limit, remote stop)
    SessionStopped,
    /// Progress of the transfer in flight
    TransferProgress(ProgressSnapshot),
    /// Clipboard text changed on the service side
    ClipboardChanged {
        /// New clipboard text
        text: String,
    },
}

impl BackendEvent {
    /// Short name for logging.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::SessionStarted { .. } => "session_started",
            Self::FileReceived { .. } => "file_received",
            Self::SessionError { .. } => "session_error",
            Self::SessionStopped => "session_stopped",
            Self::TransferProgress(_) => "transfer_progress",
            Self::ClipboardChanged { .. } => "clipboard_changed",
        }
    }
}

type Slot = Arc<Mutex<Option<mpsc::UnboundedSender<BackendEvent>>>>;

/// Owner of the single subscription slot.
#[derive(Debug, Clone, Default)]
pub struct EventHub {
    slot: Slot,
}

impl EventHub {
    /// Create a hub with no subscriber.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for the transfer service to emit events with.
    pub fn emitter(&self) -> EventEmitter {
        EventEmitter {
            slot: Arc::clone(&self.slot),
        }
    }

    /// Subscribe for the lifetime of the returned bridge.
    ///
    /// Only events emitted after this call are delivered. Subscribing again
    /// closes the previous bridge.
    pub fn subscribe(&self) -> EventBridge {
        let (tx, rx) = mpsc::unbounded_channel();
        let previous = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(tx);
        if previous.is_some() {
            tracing::debug!("Replacing existing event subscription");
        }
        EventBridge { rx }
    }
}

/// Sending side used by the transfer service.
#[derive(Debug, Clone)]
pub struct EventEmitter {
    slot: Slot,
}

impl EventEmitter {
    /// Emit `event`. Returns `false` when nobody is subscribed.
    pub fn emit(&self, event: BackendEvent) -> bool {
        let guard = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            Some(tx) => {
                if tx.send(event).is_ok() {
                    true
                } else {
                    tracing::trace!("Event bridge dropped, discarding event");
                    false
                }
            }
            None => {
                tracing::trace!(kind = event.kind(), "No subscriber, discarding event");
                false
            }
        }
    }
}

/// Receiving side, consumed one event at a time.
#[derive(Debug)]
pub struct EventBridge {
    rx: mpsc::UnboundedReceiver<BackendEvent>,
}

impl EventBridge {
    /// Next event, waiting if necessary. `None` once the hub is gone or a
    /// newer subscription replaced this one.
    pub async fn recv(&mut self) -> Option<BackendEvent> {
        self.rx.recv().await
    }

    /// Next event if one is already queued.
    pub fn try_recv(&mut self) -> Option<BackendEvent> {
        self.rx.try_recv().ok()
    }
}
