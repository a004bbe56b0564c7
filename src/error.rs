// src/error.rs
//
// Copyright, 2025.  Signal65 / Futurum Group.
//
//! Typed errors for catalog building and per-item processing.
//!
//! Store backends and CLI glue stay on `anyhow`; the pipeline converts those
//! into a `PrepError` at the item boundary so the orchestrator can tell a
//! download failure from an upload failure when it reports the run.

use image::{ImageError, ImageFormat};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrepError {
    /// Listing the source bucket failed. Fatal: there is no catalog to process.
    #[error("listing bucket `{bucket}` failed: {source:#}")]
    Listing {
        bucket: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("download of `{key}` failed: {source:#}")]
    Download {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("decoding `{key}` as {format:?} failed: {source}")]
    Decode {
        key: String,
        format: ImageFormat,
        #[source]
        source: ImageError,
    },

    #[error("jpeg encode of `{key}` failed: {source}")]
    Encode {
        key: String,
        #[source]
        source: ImageError,
    },

    #[error("upload to `{key}` failed: {source:#}")]
    Upload {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// The worker running this item panicked or was cancelled by the runtime.
    #[error("worker for `{key}` aborted: {message}")]
    TaskAborted { key: String, message: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl PrepError {
    /// True for errors that stop the whole run rather than a single item.
    pub fn is_fatal(&self) -> bool {
        matches!(self, PrepError::Listing { .. } | PrepError::Config(_))
    }

    /// Short label used in summaries and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            PrepError::Listing { .. } => "listing",
            PrepError::Download { .. } => "download",
            PrepError::Decode { .. } => "decode",
            PrepError::Encode { .. } => "encode",
            PrepError::Upload { .. } => "upload",
            PrepError::TaskAborted { .. } => "aborted",
            PrepError::Config(_) => "config",
        }
    }
}
