// src/lib.rs
//
// Copyright, 2025.  Signal65 / Futurum Group.
//
// Crate root: module tree plus public re-exports.

pub mod constants;
pub mod config;
pub mod error;

// Storage backends
pub mod object_store;
pub mod s3_client;
pub mod s3_ops;
pub mod file_store;

// Dataset preparation
pub mod catalog;
pub mod splits;
pub mod transform;
pub mod naming;
pub mod pipeline;
pub mod orchestrator;
pub mod progress;

pub use catalog::{Catalog, CatalogEntry, CatalogStats, FormatHint, build_catalog};
pub use config::{ConfigOverrides, NamingMode, PrepConfig};
pub use error::PrepError;
pub use file_store::FileSystemObjectStore;
pub use naming::{CategoryCounter, Namer};
pub use object_store::{ListPage, ObjectStore, store_for_config};
pub use orchestrator::{ItemOutcome, Orchestrator, RunReport, RunSummary};
pub use pipeline::{PipelineContext, PipelineResult, process_item};
pub use s3_ops::S3ObjectStore;
pub use splits::{Split, SplitRatios, SplitSet, split_catalog};
pub use transform::{Normalized, TransformOptions};
