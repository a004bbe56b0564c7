// src/naming.rs
//
// Copyright, 2025.  Signal65 / Futurum Group.
//
//! Output key construction and the per-category sequence counter.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::catalog::CatalogEntry;
use crate::config::NamingMode;
use crate::splits::Split;

/// Process-wide map from category to the last index handed out.
///
/// `claim_next` is the only mutation and runs entirely under one lock, so
/// concurrent callers for the same category always see distinct values.
#[derive(Debug, Default)]
pub struct CategoryCounter {
    inner: Mutex<HashMap<String, u64>>,
}

impl CategoryCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the next index for `category`. The first claim returns 1.
    pub fn claim_next(&self, category: &str) -> u64 {
        // A panic elsewhere cannot leave the map half-updated, so a poisoned
        // lock is still usable.
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let slot = map.entry(category.to_string()).or_insert(0);
        *slot += 1;
        *slot
    }

    /// Number of indices claimed so far for `category`.
    pub fn claimed(&self, category: &str) -> u64 {
        let map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        map.get(category).copied().unwrap_or(0)
    }
}

/// Turns an entry plus its split into an output key.
#[derive(Debug)]
pub struct Namer {
    mode: NamingMode,
    prefix: String,
    counter: CategoryCounter,
}

impl Namer {
    pub fn new(mode: NamingMode, prefix: &str) -> Self {
        Self {
            mode,
            prefix: prefix.to_string(),
            counter: CategoryCounter::new(),
        }
    }

    pub fn counter(&self) -> &CategoryCounter {
        &self.counter
    }

    /// Output identifier for `entry`. Under sequential naming every call
    /// claims a fresh index, so call it once per item, after the image has
    /// been normalized.
    pub fn identifier(&self, entry: &CatalogEntry) -> String {
        match self.mode {
            NamingMode::Sequential => format!("img{}", self.counter.claim_next(&entry.category)),
            NamingMode::Original => strip_extension(&entry.name).to_string(),
        }
    }

    /// `{prefix}/{category}/{split}/{identifier}.jpg`
    pub fn output_key(&self, entry: &CatalogEntry, split: Split) -> String {
        format!(
            "{}/{}/{}/{}.jpg",
            self.prefix,
            entry.category,
            split,
            self.identifier(entry)
        )
    }
}

/// Drop the final `.ext` of the last path segment, if any.
fn strip_extension(name: &str) -> &str {
    let file_start = name.rfind('/').map_or(0, |i| i + 1);
    match name[file_start..].rfind('.') {
        Some(dot) if dot > 0 => &name[..file_start + dot],
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    fn entry(key: &str) -> CatalogEntry {
        CatalogEntry::from_key(key).unwrap()
    }

    #[test]
    fn sequential_counts_per_category() {
        let namer = Namer::new(NamingMode::Sequential, "processed");
        assert_eq!(
            namer.output_key(&entry("cats/a.jpg"), Split::Train),
            "processed/cats/train/img1.jpg"
        );
        assert_eq!(
            namer.output_key(&entry("cats/b.png"), Split::Test),
            "processed/cats/test/img2.jpg"
        );
        assert_eq!(
            namer.output_key(&entry("dogs/c.png"), Split::Validate),
            "processed/dogs/validate/img1.jpg"
        );
        assert_eq!(namer.counter().claimed("cats"), 2);
        assert_eq!(namer.counter().claimed("birds"), 0);
    }

    #[test]
    fn original_name_keeps_stem() {
        let namer = Namer::new(NamingMode::Original, "processed");
        assert_eq!(
            namer.output_key(&entry("cats/tabby.png"), Split::Train),
            "processed/cats/train/tabby.jpg"
        );
        assert_eq!(
            namer.output_key(&entry("cats/2020/v1.2/tabby.final.jpg"), Split::Test),
            "processed/cats/test/2020/v1.2/tabby.final.jpg"
        );
        assert_eq!(namer.counter().claimed("cats"), 0);
    }

    #[test]
    fn strip_extension_edge_cases() {
        assert_eq!(strip_extension("a.jpg"), "a");
        assert_eq!(strip_extension(".hidden"), ".hidden");
        assert_eq!(strip_extension("noext"), "noext");
        assert_eq!(strip_extension("dir.v2/noext"), "dir.v2/noext");
    }

    #[test]
    fn concurrent_claims_are_unique() {
        let counter = Arc::new(CategoryCounter::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let counter = counter.clone();
                thread::spawn(move || (0..250).map(|_| counter.claim_next("cats")).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for h in handles {
            for idx in h.join().unwrap() {
                assert!(seen.insert(idx), "index {idx} claimed twice");
            }
        }
        assert_eq!(seen, (1..=2000).collect::<HashSet<u64>>());
    }
}
