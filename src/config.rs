// src/config.rs
//
// Copyright, 2025.  Signal65 / Futurum Group.
//
// Runtime parameters for one preprocessing run.

use clap::ValueEnum;
use std::path::PathBuf;

use crate::constants::{DEFAULT_BUCKET, DEFAULT_WORKERS, ENV_BUCKET, ENV_WORKERS, PROCESSED_PREFIX};
use crate::error::PrepError;
use crate::splits::SplitRatios;
use crate::transform::TransformOptions;

/// How output objects are named inside `processed/{category}/{split}/`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum NamingMode {
    /// `img1.jpg`, `img2.jpg`, ... numbered per category across all splits.
    #[default]
    Sequential,
    /// The source object's name with its extension replaced by `.jpg`.
    Original,
}

/// Runtime parameters used by the catalog, splitter and orchestrator.
#[derive(Debug, Clone)]
pub struct PrepConfig {
    pub bucket: String,
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
    /// When set, a local directory stands in for the bucket.
    pub local_root: Option<PathBuf>,
    pub workers: usize,
    pub naming: NamingMode,
    pub seed: Option<u64>,
    pub processed_prefix: String,
    pub ratios: SplitRatios,
    pub transform: TransformOptions,
}

/// Values given on the command line. `None` leaves the lower layer alone.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub bucket: Option<String>,
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
    pub local_root: Option<PathBuf>,
    pub workers: Option<usize>,
    pub naming: Option<NamingMode>,
    pub seed: Option<u64>,
}

impl Default for PrepConfig {
    fn default() -> Self {
        Self {
            bucket: DEFAULT_BUCKET.to_string(),
            region: None,
            endpoint_url: None,
            local_root: None,
            workers: DEFAULT_WORKERS,
            naming: NamingMode::default(),
            seed: None,
            processed_prefix: PROCESSED_PREFIX.to_string(),
            ratios: SplitRatios::default(),
            transform: TransformOptions::default(),
        }
    }
}

impl PrepConfig {
    /// Defaults overlaid with environment variables. Call `dotenvy::dotenv()`
    /// first if a `.env` file should be honoured.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overlaid with whatever `lookup` returns for each variable.
    /// Blank values are ignored; an unparsable job count keeps the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut cfg = Self::default();
        if let Some(bucket) = get(ENV_BUCKET) {
            cfg.bucket = bucket;
        }
        if let Some(workers) = get(ENV_WORKERS).and_then(|s| s.trim().parse().ok()) {
            cfg.workers = workers;
        }
        cfg.region = get("AWS_REGION");
        cfg.endpoint_url = get("AWS_ENDPOINT_URL");
        cfg
    }

    /// Apply command-line values; anything set there wins over the
    /// environment and the defaults.
    pub fn with_overrides(mut self, o: ConfigOverrides) -> Self {
        if let Some(bucket) = o.bucket {
            self.bucket = bucket;
        }
        if o.region.is_some() {
            self.region = o.region;
        }
        if o.endpoint_url.is_some() {
            self.endpoint_url = o.endpoint_url;
        }
        if o.local_root.is_some() {
            self.local_root = o.local_root;
        }
        if let Some(workers) = o.workers {
            self.workers = workers;
        }
        if let Some(naming) = o.naming {
            self.naming = naming;
        }
        if o.seed.is_some() {
            self.seed = o.seed;
        }
        self
    }

    /// Reject settings that cannot produce a meaningful run.
    pub fn validate(&self) -> Result<(), PrepError> {
        if self.workers == 0 {
            return Err(PrepError::Config("worker count must be at least 1".into()));
        }
        if self.local_root.is_none() && self.bucket.trim().is_empty() {
            return Err(PrepError::Config("bucket name is empty".into()));
        }
        if self.processed_prefix.is_empty() || self.processed_prefix.contains('/') {
            return Err(PrepError::Config(format!(
                "processed prefix `{}` must be a single non-empty key segment",
                self.processed_prefix
            )));
        }
        if self.transform.width == 0 || self.transform.height == 0 {
            return Err(PrepError::Config("target size must be non-zero".into()));
        }
        self.ratios.validated()?;
        Ok(())
    }
}
