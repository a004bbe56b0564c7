// src/file_store.rs
//
// Copyright, 2025.  Signal65 / Futurum Group.
//
// FileSystemObjectStore: a local directory presented through the same
// ObjectStore interface as a bucket. Used for dry runs against a local copy
// of the dataset and by the integration tests.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::fs;
use tracing::{debug, trace};

use crate::constants::DEFAULT_LIST_PAGE_SIZE;
use crate::object_store::{ListPage, ObjectStore};

/// FileSystem adapter that implements ObjectStore for a root directory.
///
/// Key mapping: `cats/tabby.jpg` -> `{root}/cats/tabby.jpg`.
///
/// Listing walks the tree once per listing (on the first page), sorts the
/// keys, and serves later pages from that snapshot. The continuation token
/// is the last key returned, so the next page starts strictly after it.
#[derive(Debug, Clone)]
pub struct FileSystemObjectStore {
    root: PathBuf,
    location: String,
    page_size: usize,
    snapshot: Arc<Mutex<Option<Arc<Vec<String>>>>>,
}

impl FileSystemObjectStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self::with_page_size(root, DEFAULT_LIST_PAGE_SIZE)
    }

    pub fn with_page_size(root: impl AsRef<Path>, page_size: usize) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            location: root.display().to_string(),
            root,
            page_size: page_size.max(1),
            snapshot: Arc::new(Mutex::new(None)),
        }
    }

    /// Resolve a key to a path under root, rejecting anything that would
    /// escape it.
    fn key_to_path(&self, key: &str) -> Result<PathBuf> {
        let rel = Path::new(key);
        if key.is_empty()
            || rel
                .components()
                .any(|c| !matches!(c, Component::Normal(_)))
        {
            bail!("invalid object key `{}`", key);
        }
        Ok(self.root.join(rel))
    }

    fn cached_snapshot(&self) -> Option<Arc<Vec<String>>> {
        self.snapshot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    async fn walk(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = fs::read_dir(&dir)
                .await
                .with_context(|| format!("reading directory {}", dir.display()))?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    pending.push(path);
                } else if file_type.is_file() {
                    let rel = path.strip_prefix(&self.root)?;
                    let key = rel
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy())
                        .collect::<Vec<_>>()
                        .join("/");
                    keys.push(key);
                }
            }
        }

        keys.sort();
        Ok(keys)
    }
}

#[async_trait]
impl ObjectStore for FileSystemObjectStore {
    fn location(&self) -> &str {
        &self.location
    }

    async fn list_page(&self, continuation: Option<String>) -> Result<ListPage> {
        let keys = match continuation.is_some().then(|| self.cached_snapshot()).flatten() {
            Some(keys) => keys,
            None => {
                let keys = Arc::new(self.walk().await?);
                *self.snapshot.lock().unwrap_or_else(|e| e.into_inner()) = Some(keys.clone());
                keys
            }
        };

        let start = match continuation.as_deref() {
            Some(after) => keys.partition_point(|k| k.as_str() <= after),
            None => 0,
        };
        let end = (start + self.page_size).min(keys.len());
        let page: Vec<String> = keys[start..end].to_vec();
        let next_continuation = if end < keys.len() {
            page.last().cloned()
        } else {
            None
        };

        trace!(start, returned = page.len(), "file store list page");
        Ok(ListPage {
            keys: page,
            next_continuation,
        })
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        let path = self.key_to_path(key)?;
        let data = fs::read(&path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        debug!(key, bytes = data.len(), "file store GET");
        Ok(Bytes::from(data))
    }

    async fn put(&self, key: &str, data: Vec<u8>) -> Result<()> {
        let path = self.key_to_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let len = data.len();
        fs::write(&path, data)
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        debug!(key, bytes = len, "file store PUT");
        Ok(())
    }
}
