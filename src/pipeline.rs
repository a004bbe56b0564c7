// src/pipeline.rs
//
// Copyright, 2025.  Signal65 / Futurum Group.
//
//! Per-item pipeline: download → sniff/decode/normalize/encode → name → upload.

use std::sync::Arc;
use tracing::{debug, trace};

use crate::catalog::CatalogEntry;
use crate::error::PrepError;
use crate::naming::Namer;
use crate::object_store::ObjectStore;
use crate::splits::Split;
use crate::transform::{self, Normalized, TransformError, TransformOptions};

/// Outcome of one pipeline invocation.
#[derive(Debug)]
pub enum PipelineResult {
    /// Normalized image stored under this key.
    Uploaded(String),
    /// Content was not a recognizable image; nothing was uploaded.
    Invalid,
    Failed(PrepError),
}

impl PipelineResult {
    pub fn is_uploaded(&self) -> bool {
        matches!(self, PipelineResult::Uploaded(_))
    }

    pub fn output_key(&self) -> Option<&str> {
        match self {
            PipelineResult::Uploaded(key) => Some(key),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&PrepError> {
        match self {
            PipelineResult::Failed(e) => Some(e),
            _ => None,
        }
    }
}

impl From<Result<Option<String>, PrepError>> for PipelineResult {
    fn from(r: Result<Option<String>, PrepError>) -> Self {
        match r {
            Ok(Some(key)) => PipelineResult::Uploaded(key),
            Ok(None) => PipelineResult::Invalid,
            Err(e) => PipelineResult::Failed(e),
        }
    }
}

/// Everything a worker needs besides the entry itself. Cheap to clone.
#[derive(Clone)]
pub struct PipelineContext {
    pub store: Arc<dyn ObjectStore>,
    pub namer: Arc<Namer>,
    pub transform: TransformOptions,
}

impl PipelineContext {
    pub fn new(store: Arc<dyn ObjectStore>, namer: Arc<Namer>, transform: TransformOptions) -> Self {
        Self {
            store,
            namer,
            transform,
        }
    }
}

/// Run the full pipeline for `entry`. Never panics on bad input; every
/// failure ends up in the returned value.
pub async fn process_item(ctx: &PipelineContext, entry: &CatalogEntry, split: Split) -> PipelineResult {
    try_process(ctx, entry, split).await.into()
}

async fn try_process(
    ctx: &PipelineContext,
    entry: &CatalogEntry,
    split: Split,
) -> Result<Option<String>, PrepError> {
    let key = &entry.remote_key;

    let raw = ctx
        .store
        .get(key)
        .await
        .map_err(|source| PrepError::Download {
            key: key.clone(),
            source,
        })?;
    trace!(key = %key, bytes = raw.len(), "downloaded");

    let opts = ctx.transform;
    let normalized = tokio::task::spawn_blocking(move || transform::normalize(&raw, &opts))
        .await
        .map_err(|e| PrepError::TaskAborted {
            key: key.clone(),
            message: e.to_string(),
        })?
        .map_err(|e| match e {
            TransformError::Decode { format, source } => PrepError::Decode {
                key: key.clone(),
                format,
                source,
            },
            TransformError::Encode(source) => PrepError::Encode {
                key: key.clone(),
                source,
            },
        })?;

    let jpeg = match normalized {
        Normalized::Jpeg(bytes) => bytes,
        Normalized::Invalid => {
            debug!(key = %key, "content is not a recognizable image");
            return Ok(None);
        }
    };

    // Claimed only once the image is known good, so invalid items leave no
    // holes in the sequence.
    let output_key = ctx.namer.output_key(entry, split);
    ctx.store
        .put(&output_key, jpeg)
        .await
        .map_err(|source| PrepError::Upload {
            key: output_key.clone(),
            source,
        })?;

    Ok(Some(output_key))
}
