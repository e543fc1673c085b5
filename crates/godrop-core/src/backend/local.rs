//! Directory listing over the local filesystem.

use std::path::Path;

use async_trait::async_trait;

use super::DirectoryLister;
use crate::error::{Error, Result};
use crate::navigator::DirectoryEntry;

/// Lists directories on the machine the controller runs on.
#[derive(Debug, Clone, Default)]
pub struct LocalFilesystem {
    show_hidden: bool,
}

impl LocalFilesystem {
    /// Create a lister that skips dot-files.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Include dot-files in listings.
    #[must_use]
    pub fn with_hidden(mut self, show_hidden: bool) -> Self {
        self.show_hidden = show_hidden;
        self
    }

    /// The user's home directory.
    pub fn home_directory(&self) -> Result<String> {
        dirs::home_dir()
            .map(|p| p.to_string_lossy().to_string())
            .ok_or_else(|| Error::DirectoryNotFound("home directory".to_string()))
    }

    /// The user's downloads directory, falling back to `~/Downloads`.
    pub fn default_save_location(&self) -> Result<String> {
        dirs::download_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join("Downloads")))
            .map(|p| p.to_string_lossy().to_string())
            .ok_or_else(|| Error::DirectoryNotFound("downloads directory".to_string()))
    }

    async fn list(&self, path: &str) -> Result<Vec<DirectoryEntry>> {
        let mut read_dir = tokio::fs::read_dir(path)
            .await
            .map_err(|e| Error::from_io(e, path))?;

        let mut entries = Vec::new();
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| Error::from_io(e, path))?
        {
            let name = entry.file_name().to_string_lossy().to_string();
            if !self.show_hidden && name.starts_with('.') {
                continue;
            }

            let full_path = Path::new(path).join(&name).to_string_lossy().to_string();

            // follow symlinks so a link to a directory can be browsed into
            match tokio::fs::metadata(entry.path()).await {
                Ok(metadata) if metadata.is_dir() => {
                    entries.push(DirectoryEntry::folder(name, full_path));
                }
                Ok(metadata) => {
                    entries.push(DirectoryEntry::file(name, full_path, Some(metadata.len())));
                }
                Err(e) => {
                    tracing::debug!(path = %full_path, error = %e, "Skipping size for unreadable entry");
                    entries.push(DirectoryEntry::file(name, full_path, None));
                }
            }
        }

        Ok(entries)
    }
}

#[cfg(windows)]
fn list_roots() -> Vec<DirectoryEntry> {
    ('A'..='Z')
        .map(|drive| format!("{drive}:\\"))
        .filter(|root| Path::new(root).exists())
        .map(|root| DirectoryEntry::folder(root.clone(), root))
        .collect()
}

#[async_trait]
impl DirectoryLister for LocalFilesystem {
    async fn read_directory(&self, path: &str) -> Result<Vec<DirectoryEntry>> {
        if path.is_empty() || path == crate::ROOT_PATH {
            #[cfg(windows)]
            return Ok(list_roots());
            #[cfg(not(windows))]
            return self.list("/").await;
        }
        self.list(path).await
    }
}
