// src/progress.rs
//
// Copyright, 2025.  Signal65 / Futurum Group.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Item-count progress bar for the processing phase.
#[derive(Clone)]
pub struct ItemProgress {
    bar: ProgressBar,
}

impl ItemProgress {
    pub fn new(operation: &str, total_items: u64) -> Self {
        let bar = ProgressBar::new(total_items);
        let style = ProgressStyle::default_bar()
            .template(&format!(
                "{}: {{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} items ({{per_sec}}, ETA: {{eta}}) {{msg}}",
                operation
            ))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ");
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(200));
        Self { bar }
    }

    /// A bar that draws nothing, for `--no-progress` and tests.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn inc(&self) {
        self.bar.inc(1);
    }

    /// Clear the bar so later stdout lines are not interleaved with it.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
