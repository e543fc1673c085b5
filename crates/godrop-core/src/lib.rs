//! # Godrop Core Library
//!
//! `godrop-core` provides the client-side session control for Godrop, an
//! ad-hoc local network tool for broadcasting files, opening a dropzone to
//! receive files, and syncing clipboard text between devices.
//!
//! The transfer server itself lives behind the [`backend::Backend`] trait;
//! this crate owns everything the user sees: browsing, selection, session
//! lifecycle, live events, clipboard history and the detached viewer's
//! download gate.
//!
//! ## Modules
//!
//! - [`backend`] - Collaborator traits and the local filesystem lister
//! - [`clipboard`] - Clipboard history and OS clipboard access
//! - [`config`] - Configuration management
//! - [`events`] - Typed channel for backend push notifications
//! - [`navigator`] - Directory listing and traversal
//! - [`poll`] - Cancellable periodic tasks
//! - [`selection`] - Files chosen for a send session
//! - [`session`] - Session state machine and its driver loop
//! - [`viewer`] - Detached viewer: security gate and countdown
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use godrop_core::events::EventHub;
//! use godrop_core::session::{drive, ControllerCommand, SessionConfig, SessionController, SessionMode};
//!
//! let hub = EventHub::new();
//! let mut controller = SessionController::new(Arc::clone(&backend));
//! controller.bootstrap().await;
//! let mut state = controller.subscribe();
//!
//! let (commands, commands_rx) = tokio::sync::mpsc::unbounded_channel();
//! tokio::spawn(drive(controller, commands_rx, hub.subscribe()));
//! commands.send(ControllerCommand::Start {
//!     mode: SessionMode::Receive,
//!     config: SessionConfig::default(),
//! })?;
//! while state.changed().await.is_ok() {
//!     println!("{:?}", state.borrow().logs.last());
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]

pub mod backend;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod events;
pub mod navigator;
pub mod poll;
pub mod selection;
pub mod session;
pub mod viewer;

pub use error::{Error, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default port requested from the transfer service
pub const DEFAULT_PORT: u16 = 1111;

/// Default number of downloads allowed for a send session
pub const DEFAULT_DOWNLOAD_LIMIT: u32 = 1;

/// Default send session timeout in minutes (0 means no expiry)
pub const DEFAULT_TIMEOUT_MINUTES: u32 = 10;

/// Maximum number of clipboard history entries kept
pub const CLIPBOARD_HISTORY_CAPACITY: usize = 50;

/// Path used when navigating above the top of a path
pub const ROOT_PATH: &str = "root";
