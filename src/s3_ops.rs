// src/s3_ops.rs
//
// Copyright, 2025. Signal65 / Futurum Group.
//
//! Logged S3 operations (LIST, GET, PUT) behind the `ObjectStore` trait.
//!
//! `S3ObjectStore` wraps an explicitly constructed AWS S3 client bound to a
//! single bucket. Every call is traced at debug level with its duration and
//! byte count.

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use std::time::Instant;
use tracing::debug;

use crate::object_store::{ListPage, ObjectStore};

/// An S3 bucket exposed as an `ObjectStore`.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

/// Private helper struct to reduce logging boilerplate.
struct LogContext {
    operation: &'static str,
    key: String,
    start_time: Instant,
}

impl LogContext {
    fn new(operation: &'static str, key: &str) -> Self {
        Self {
            operation,
            key: key.to_string(),
            start_time: Instant::now(),
        }
    }

    fn finish(self, bucket: &str, bytes: u64, ok: bool) {
        debug!(
            op = self.operation,
            bucket,
            key = %self.key,
            bytes,
            ok,
            elapsed_ms = self.start_time.elapsed().as_millis() as u64,
            "s3 op complete"
        );
    }
}

impl S3ObjectStore {
    /// Creates a new store over `bucket`.
    pub fn new(client: Client, bucket: &str) -> Self {
        Self {
            client,
            bucket: bucket.to_string(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn location(&self) -> &str {
        &self.bucket
    }

    /// LIST one page via ListObjectsV2.
    async fn list_page(&self, continuation: Option<String>) -> Result<ListPage> {
        let ctx = LogContext::new("LIST", continuation.as_deref().unwrap_or(""));

        let mut req = self.client.list_objects_v2().bucket(&self.bucket);
        if let Some(token) = continuation {
            req = req.continuation_token(token);
        }

        match req.send().await {
            Ok(resp) => {
                let keys: Vec<String> = resp
                    .contents()
                    .iter()
                    .filter_map(|obj| obj.key().map(str::to_owned))
                    .collect();
                let next_continuation = resp.next_continuation_token().map(str::to_string);
                ctx.finish(&self.bucket, keys.len() as u64, true);
                Ok(ListPage {
                    keys,
                    next_continuation,
                })
            }
            Err(e) => {
                ctx.finish(&self.bucket, 0, false);
                Err(e).context("list_objects_v2 failed")
            }
        }
    }

    /// GET (Download) an object.
    async fn get(&self, key: &str) -> Result<Bytes> {
        let ctx = LogContext::new("GET", key);

        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match result {
            Ok(output) => {
                let body = output
                    .body
                    .collect()
                    .await
                    .with_context(|| format!("reading body of s3://{}/{}", self.bucket, key))?
                    .into_bytes();
                ctx.finish(&self.bucket, body.len() as u64, true);
                Ok(body)
            }
            Err(e) => {
                ctx.finish(&self.bucket, 0, false);
                Err(e).with_context(|| format!("get_object s3://{}/{}", self.bucket, key))
            }
        }
    }

    /// PUT (Upload) an object.
    async fn put(&self, key: &str, data: Vec<u8>) -> Result<()> {
        let ctx = LogContext::new("PUT", key);
        let bytes = data.len() as u64;

        let result = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type("image/jpeg")
            .body(ByteStream::from(data))
            .send()
            .await;

        ctx.finish(&self.bucket, bytes, result.is_ok());
        result
            .map(|_| ())
            .with_context(|| format!("put_object s3://{}/{}", self.bucket, key))
    }
}
