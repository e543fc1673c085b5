//! Common test utilities for `Godrop` integration tests.
//!
//! [`FakeBackend`] stands in for the transfer service: it records every call
//! and answers from canned data.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use godrop_core::backend::{Backend, DirectoryLister, SendRequest, SessionInfo};
use godrop_core::navigator::DirectoryEntry;
use godrop_core::{Error, Result};

/// A call made to the fake backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ReadDirectory(String),
    HomeDirectory,
    DefaultSaveLocation,
    SelectDirectory,
    StartSend(SendRequest),
    StartReceive { port: u16, save_location: String },
    StartClipboard(u16),
    Stop,
    GetClipboard,
    SetClipboard(String),
    ClipboardHistory,
}

impl Call {
    pub fn is_start(&self) -> bool {
        matches!(
            self,
            Self::StartSend(_) | Self::StartReceive { .. } | Self::StartClipboard(_)
        )
    }
}

/// Recording backend with canned answers.
#[derive(Default)]
pub struct FakeBackend {
    calls: Mutex<Vec<Call>>,
    listings: Mutex<HashMap<String, Vec<DirectoryEntry>>>,
    start_failure: Mutex<Option<String>>,
    stop_fails: AtomicBool,
    clipboard: Mutex<String>,
    history: Mutex<Vec<String>>,
    picked_directory: Mutex<Option<String>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        let backend = Self::default();
        backend.add_listing(
            "/home/ana",
            vec![
                DirectoryEntry::folder("Docs", "/home/ana/Docs"),
                DirectoryEntry::file("notes.txt", "/home/ana/notes.txt", Some(120)),
                DirectoryEntry::file("photo.jpg", "/home/ana/photo.jpg", Some(4096)),
            ],
        );
        backend.add_listing(
            "/home/ana/Docs",
            vec![DirectoryEntry::file("cv.pdf", "/home/ana/Docs/cv.pdf", Some(900))],
        );
        backend.add_listing("/home", vec![DirectoryEntry::folder("ana", "/home/ana")]);
        backend
    }

    pub fn add_listing(&self, path: &str, entries: Vec<DirectoryEntry>) {
        self.listings
            .lock()
            .unwrap()
            .insert(path.to_string(), entries);
    }

    pub fn fail_next_start(&self, message: &str) {
        *self.start_failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn fail_stop(&self) {
        self.stop_fails.store(true, Ordering::SeqCst);
    }

    pub fn set_clipboard(&self, text: &str) {
        *self.clipboard.lock().unwrap() = text.to_string();
    }

    pub fn clipboard(&self) -> String {
        self.clipboard.lock().unwrap().clone()
    }

    pub fn set_history(&self, entries: &[&str]) {
        *self.history.lock().unwrap() = entries.iter().map(ToString::to_string).collect();
    }

    pub fn pick_directory(&self, path: Option<&str>) {
        *self.picked_directory.lock().unwrap() = path.map(str::to_string);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn start_calls(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_start).collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn start_result(&self, port: u16) -> Result<SessionInfo> {
        if let Some(message) = self.start_failure.lock().unwrap().take() {
            return Err(Error::Startup(message));
        }
        Ok(session_info(port))
    }
}

/// Session details the fake returns for `port`.
pub fn session_info(port: u16) -> SessionInfo {
    SessionInfo {
        ip: "192.168.1.20".to_string(),
        port,
        full_url: format!("http://192.168.1.20:{port}"),
        qr_code: "data:image/png;base64,AAAA".to_string(),
    }
}

#[async_trait]
impl DirectoryLister for FakeBackend {
    async fn read_directory(&self, path: &str) -> Result<Vec<DirectoryEntry>> {
        self.record(Call::ReadDirectory(path.to_string()));
        self.listings
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| Error::DirectoryNotFound(path.to_string()))
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn home_directory(&self) -> Result<String> {
        self.record(Call::HomeDirectory);
        Ok("/home/ana".to_string())
    }

    async fn default_save_location(&self) -> Result<String> {
        self.record(Call::DefaultSaveLocation);
        Ok("/home/ana/Downloads".to_string())
    }

    async fn select_directory(&self) -> Result<Option<String>> {
        self.record(Call::SelectDirectory);
        Ok(self.picked_directory.lock().unwrap().clone())
    }

    async fn start_send_session(&self, request: SendRequest) -> Result<SessionInfo> {
        let port = request.port;
        self.record(Call::StartSend(request));
        self.start_result(port)
    }

    async fn start_receive_session(&self, port: u16, save_location: &str) -> Result<SessionInfo> {
        self.record(Call::StartReceive {
            port,
            save_location: save_location.to_string(),
        });
        self.start_result(port)
    }

    async fn start_clipboard_session(&self, port: u16) -> Result<SessionInfo> {
        self.record(Call::StartClipboard(port));
        self.start_result(port)
    }

    async fn stop_session(&self) -> Result<()> {
        self.record(Call::Stop);
        if self.stop_fails.load(Ordering::SeqCst) {
            return Err(Error::Internal("server did not shut down".to_string()));
        }
        Ok(())
    }

    async fn system_clipboard_text(&self) -> Result<String> {
        self.record(Call::GetClipboard);
        Ok(self.clipboard())
    }

    async fn set_system_clipboard_text(&self, text: &str) -> Result<()> {
        self.record(Call::SetClipboard(text.to_string()));
        self.set_clipboard(text);
        Ok(())
    }

    async fn clipboard_history(&self) -> Result<Vec<String>> {
        self.record(Call::ClipboardHistory);
        Ok(self.history.lock().unwrap().clone())
    }
}
