//! File-backed key-value store
//!
//! All keys live in one JSON object on disk:
//!
//! ```json
//! { "restaurant_sessions": "[...]", "admin_session": "{...}" }
//! ```
//!
//! Values are opaque text, exactly as callers hand them in. Every write
//! rewrites the whole file through a temporary file and a rename, so a crash
//! never leaves a half-written document behind. A file that is not a JSON
//! object is treated as empty and replaced on the next write.

use super::KeyValueStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

type Document = BTreeMap<String, String>;

/// File store
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles inside this process
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Create a store backed by the file at `path`
    ///
    /// The file and its parent directory are created on first write.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document, failing on unreadable or malformed content
    async fn read_document(&self) -> Result<Document> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Document::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read store file {:?}", self.path))
            }
        };

        if content.trim().is_empty() {
            return Ok(Document::new());
        }

        serde_json::from_str(&content)
            .with_context(|| format!("Store file {:?} is not a JSON object of strings", self.path))
    }

    /// Read the document for modification, starting over if it is corrupt
    async fn read_document_for_write(&self) -> Result<Document> {
        match self.read_document().await {
            Ok(document) => Ok(document),
            Err(e) if self.path.exists() && e.downcast_ref::<serde_json::Error>().is_some() => {
                tracing::warn!("Replacing corrupt store file {:?}: {:#}", self.path, e);
                Ok(Document::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Atomically replace the file with `document`
    async fn write_document(&self, document: Document) -> Result<()> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomically(&path, &document))
            .await
            .context("Store writer task failed")?
    }
}

fn write_atomically(path: &Path, document: &Document) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create store directory {:?}", dir))?;

    let json = serde_json::to_string_pretty(document).context("Failed to encode store")?;

    let mut tmp = tempfile::NamedTempFile::new_in(&dir)
        .with_context(|| format!("Failed to create temp file in {:?}", dir))?;
    tmp.write_all(json.as_bytes())
        .context("Failed to write store contents")?;
    tmp.as_file().sync_all().context("Failed to flush store contents")?;
    tmp.persist(path)
        .with_context(|| format!("Failed to replace store file {:?}", path))?;

    Ok(())
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let document = self.read_document().await?;
        Ok(document.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.read_document_for_write().await?;
        document.insert(key.to_string(), value.to_string());
        self.write_document(document).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.read_document_for_write().await?;
        if document.remove(key).is_none() {
            return Ok(());
        }
        self.write_document(document).await
    }
}
