// src/catalog.rs
//
// Copyright, 2025.  Signal65 / Futurum Group.
//
//! Catalog lister: turns a bucket listing into `CatalogEntry` values.
//!
//! Keys follow `{category}/{name}`. Nothing is downloaded here; the format
//! recorded on an entry is only the filename's claim; the pipeline sniffs
//! the real format from content.

use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, info};

use crate::error::PrepError;
use crate::object_store::ObjectStore;

/// Format suggested by the filename suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatHint {
    Jpg,
    Png,
    Unknown,
}

impl FormatHint {
    /// Classify by suffix. Matching is exact: `.JPG` and `.jpeg` are unknown.
    pub fn from_name(name: &str) -> Self {
        if name.ends_with(".jpg") {
            FormatHint::Jpg
        } else if name.ends_with(".png") {
            FormatHint::Png
        } else {
            FormatHint::Unknown
        }
    }
}

impl fmt::Display for FormatHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FormatHint::Jpg => "jpg",
            FormatHint::Png => "png",
            FormatHint::Unknown => "unknown",
        })
    }
}

/// One source object eligible for processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub category: String,
    pub name: String,
    pub remote_key: String,
    pub format: FormatHint,
}

impl CatalogEntry {
    /// Split `key` on its first `/`. The tail is kept intact, so
    /// `a/b/c.jpg` has category `a` and name `b/c.jpg`.
    ///
    /// Returns `None` for keys with no category (no separator, empty first
    /// segment) and for directory markers ending in `/`.
    pub fn from_key(key: &str) -> Option<Self> {
        let (category, name) = key.split_once('/')?;
        if category.is_empty() || name.is_empty() || name.ends_with('/') {
            return None;
        }
        Some(Self {
            category: category.to_string(),
            name: name.to_string(),
            remote_key: key.to_string(),
            format: FormatHint::from_name(name),
        })
    }
}

/// Counters gathered while listing, reported by the CLI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogStats {
    /// Keys returned by the store.
    pub listed: usize,
    /// Keys under the processed prefix.
    pub skipped_processed: usize,
    /// Keys that do not look like `{category}/{name}`.
    pub skipped_malformed: usize,
}

/// Every entry found in the bucket, including unknown formats.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub entries: Vec<CatalogEntry>,
    pub stats: CatalogStats,
}

impl Catalog {
    /// Build a catalog from raw keys, skipping the `processed_prefix` namespace.
    pub fn from_keys<I, S>(keys: I, processed_prefix: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut catalog = Catalog::default();
        for key in keys {
            let key = key.as_ref();
            catalog.stats.listed += 1;
            match CatalogEntry::from_key(key) {
                Some(entry) if entry.category == processed_prefix => {
                    catalog.stats.skipped_processed += 1;
                }
                Some(entry) => catalog.entries.push(entry),
                None => {
                    debug!(key, "skipping key without category");
                    catalog.stats.skipped_malformed += 1;
                }
            }
        }
        catalog
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct categories, sorted.
    pub fn categories(&self) -> BTreeSet<&str> {
        self.entries.iter().map(|e| e.category.as_str()).collect()
    }

    pub fn unknown_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.format == FormatHint::Unknown)
            .count()
    }

    /// Entries whose suffix names a supported format.
    pub fn retained(&self) -> Vec<CatalogEntry> {
        self.entries
            .iter()
            .filter(|e| e.format != FormatHint::Unknown)
            .cloned()
            .collect()
    }
}

/// List the whole store and build the catalog. Any listing error is fatal.
pub async fn build_catalog(
    store: &dyn ObjectStore,
    processed_prefix: &str,
) -> Result<Catalog, PrepError> {
    let keys = store.list_all().await.map_err(|source| PrepError::Listing {
        bucket: store.location().to_string(),
        source,
    })?;

    let catalog = Catalog::from_keys(&keys, processed_prefix);
    info!(
        location = store.location(),
        listed = catalog.stats.listed,
        entries = catalog.len(),
        unknown = catalog.unknown_count(),
        "catalog built"
    );
    Ok(catalog)
}
