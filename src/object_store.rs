// src/object_store.rs
//
// Copyright, 2025.  Signal65 / Futurum Group.
//
// Pluggable object-store abstraction.
// A store is bound to one bucket (or one local root directory); keys are
// bucket-relative and `/`-separated, e.g. `cats/tabby.jpg`.

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

use crate::config::PrepConfig;
use crate::file_store::FileSystemObjectStore;
use crate::s3_ops::S3ObjectStore;

/// One page of a listing plus the token for the next page, if any.
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    pub keys: Vec<String>,
    pub next_continuation: Option<String>,
}

/// ObjectStore trait for pluggable storage backends.
///
/// Implementations must be safe to share across worker tasks; the pipeline
/// holds one `Arc<dyn ObjectStore>` for the whole run.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Human readable location (bucket name or root path) for logs.
    fn location(&self) -> &str;

    /// Fetch one page of keys. `None` asks for the first page.
    async fn list_page(&self, continuation: Option<String>) -> Result<ListPage>;

    /// Get entire object into memory.
    async fn get(&self, key: &str) -> Result<Bytes>;

    /// Put object data to storage, replacing whatever is there.
    async fn put(&self, key: &str, data: Vec<u8>) -> Result<()>;

    /// Follow continuation tokens until the listing is exhausted.
    async fn list_all(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut cont: Option<String> = None;
        loop {
            let page = self.list_page(cont.take()).await?;
            keys.extend(page.keys);
            match page.next_continuation {
                Some(token) => cont = Some(token),
                None => break,
            }
        }
        Ok(keys)
    }
}

/// Build the store selected by `cfg`: the local directory when `local_root`
/// is set, S3 otherwise.
pub async fn store_for_config(cfg: &PrepConfig) -> Result<Arc<dyn ObjectStore>> {
    match &cfg.local_root {
        Some(root) => Ok(Arc::new(FileSystemObjectStore::new(root))),
        None => {
            let client = crate::s3_client::build_s3_client(cfg).await?;
            Ok(Arc::new(S3ObjectStore::new(client, &cfg.bucket)))
        }
    }
}
