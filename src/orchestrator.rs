// src/orchestrator.rs
//
// Copyright, 2025.  Signal65 / Futurum Group.
//
//! Bounded-concurrency driver for the item pipeline.
//!
//! One task is spawned per entry; a semaphore caps how many run at once.
//! Each task reports exactly one `ItemOutcome`, including tasks that panic,
//! and the orchestrator returns only after every outcome is collected.

use futures::{StreamExt, stream::FuturesUnordered};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::catalog::CatalogEntry;
use crate::error::PrepError;
use crate::pipeline::{PipelineContext, PipelineResult, process_item};
use crate::progress::ItemProgress;
use crate::splits::{Split, SplitSet};

/// One entry's result, tagged with where it came from.
#[derive(Debug)]
pub struct ItemOutcome {
    pub entry: CatalogEntry,
    pub split: Split,
    pub result: PipelineResult,
}

/// Aggregate counts for a set of outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub uploaded: usize,
    pub invalid: usize,
    pub failed: usize,
}

impl RunSummary {
    fn record(&mut self, result: &PipelineResult) {
        self.total += 1;
        match result {
            PipelineResult::Uploaded(_) => self.uploaded += 1,
            PipelineResult::Invalid => self.invalid += 1,
            PipelineResult::Failed(_) => self.failed += 1,
        }
    }
}

/// Everything a run produced.
#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<ItemOutcome>,
}

impl RunReport {
    pub fn summary(&self) -> RunSummary {
        let mut s = RunSummary::default();
        for o in &self.outcomes {
            s.record(&o.result);
        }
        s
    }

    pub fn by_split(&self) -> BTreeMap<Split, RunSummary> {
        let mut map: BTreeMap<Split, RunSummary> = BTreeMap::new();
        for o in &self.outcomes {
            map.entry(o.split).or_default().record(&o.result);
        }
        map
    }

    pub fn uploaded_keys(&self) -> impl Iterator<Item = &str> {
        self.outcomes.iter().filter_map(|o| o.result.output_key())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&CatalogEntry, &PrepError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.error().map(|e| (&o.entry, e)))
    }

    pub fn invalid(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.result, PipelineResult::Invalid))
            .map(|o| &o.entry)
    }
}

/// Runs the pipeline over a `SplitSet` with at most `workers` items in flight.
pub struct Orchestrator {
    ctx: PipelineContext,
    workers: usize,
    progress: ItemProgress,
}

impl Orchestrator {
    pub fn new(ctx: PipelineContext, workers: usize) -> Self {
        Self {
            ctx,
            workers: workers.max(1),
            progress: ItemProgress::hidden(),
        }
    }

    pub fn with_progress(mut self, progress: ItemProgress) -> Self {
        self.progress = progress;
        self
    }

    /// Process every entry of `splits`. Per-item failures, including panics,
    /// are recorded in the report rather than returned.
    pub async fn run(&self, splits: &SplitSet) -> RunReport {
        let items: Vec<(Split, CatalogEntry)> =
            splits.iter().map(|(s, e)| (s, e.clone())).collect();
        self.run_items(items).await
    }

    /// Same as [`run`](Self::run) for an arbitrary list of `(split, entry)` pairs.
    pub async fn run_items(&self, items: Vec<(Split, CatalogEntry)>) -> RunReport {
        let total = items.len();
        info!(items = total, workers = self.workers, "dispatching pipeline tasks");

        let sem = Arc::new(Semaphore::new(self.workers));
        let mut futs = FuturesUnordered::new();

        for (split, entry) in items {
            let sem = sem.clone();
            let ctx = self.ctx.clone();
            let progress = self.progress.clone();
            let task_entry = entry.clone();

            let handle = tokio::spawn(async move {
                let result = match sem.acquire_owned().await {
                    Ok(_permit) => process_item(&ctx, &task_entry, split).await,
                    Err(e) => PipelineResult::Failed(PrepError::TaskAborted {
                        key: task_entry.remote_key.clone(),
                        message: e.to_string(),
                    }),
                };
                progress.inc();
                result
            });

            futs.push(async move {
                let result = match handle.await {
                    Ok(result) => result,
                    Err(e) => PipelineResult::Failed(PrepError::TaskAborted {
                        key: entry.remote_key.clone(),
                        message: e.to_string(),
                    }),
                };
                ItemOutcome {
                    entry,
                    split,
                    result,
                }
            });
        }

        let mut outcomes = Vec::with_capacity(total);
        while let Some(outcome) = futs.next().await {
            match &outcome.result {
                PipelineResult::Uploaded(key) => debug!(source = %outcome.entry.remote_key, %key, "uploaded"),
                PipelineResult::Invalid => debug!(source = %outcome.entry.remote_key, "invalid image"),
                PipelineResult::Failed(e) => {
                    warn!(source = %outcome.entry.remote_key, kind = e.kind(), "{}", e)
                }
            }
            outcomes.push(outcome);
        }
        self.progress.finish();

        let report = RunReport { outcomes };
        let s = report.summary();
        info!(
            total = s.total,
            uploaded = s.uploaded,
            invalid = s.invalid,
            failed = s.failed,
            "pipeline run complete"
        );
        report
    }
}
