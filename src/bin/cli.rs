//
// Copyright, 2025.  Signal65 / Futurum Group.
//
//! Preprocess an image bucket into fixed-size JPEG train/test/validate splits.
//!
//! Examples:
//! ```bash
//! s3imgprep                                  # default bucket, 10 workers
//! s3imgprep --bucket my-images -j 32 -v      # other bucket, more workers
//! s3imgprep --naming original --seed 42      # keep source names, reproducible split
//! s3imgprep --local-root ./dataset           # local directory instead of S3
//! ```

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use std::io::{self, ErrorKind, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use s3imgprep::progress::ItemProgress;
use s3imgprep::{
    ConfigOverrides, Namer, NamingMode, Orchestrator, PipelineContext, PrepConfig, PrepError,
    build_catalog, split_catalog, store_for_config,
};

/// Macro to safely print with broken pipe handling
macro_rules! safe_println {
    ($($arg:tt)*) => {
        match writeln!(io::stdout(), $($arg)*) {
            Ok(_) => {},
            Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                // Gracefully exit on broken pipe (e.g., when piped to head/tail)
                std::process::exit(0);
            }
            Err(e) => return Err(e.into())
        }
    };
}

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(
        short = 'v',
        long,
        action = ArgAction::Count,
        help = "Increase log verbosity: -v = Info, -vv = Debug",
    )]
    verbose: u8,

    /// Source and destination bucket (env: S3IMGPREP_BUCKET).
    #[arg(long)]
    bucket: Option<String>,

    /// AWS region (env: AWS_REGION).
    #[arg(long)]
    region: Option<String>,

    /// Custom S3 endpoint for S3-compatible services (env: AWS_ENDPOINT_URL).
    #[arg(long)]
    endpoint_url: Option<String>,

    /// Use a local directory as the bucket instead of S3.
    #[arg(long, value_name = "DIR")]
    local_root: Option<PathBuf>,

    /// Maximum items processed concurrently (env: S3IMGPREP_JOBS).
    #[arg(short = 'j', long = "jobs")]
    jobs: Option<usize>,

    /// How output objects are named.
    #[arg(long, value_enum)]
    naming: Option<NamingMode>,

    /// Seed for a reproducible train/test/validate split.
    #[arg(long)]
    seed: Option<u64>,

    /// Disable the progress bar.
    #[arg(long)]
    no_progress: bool,
}

impl Cli {
    fn into_config(self) -> PrepConfig {
        PrepConfig::from_env().with_overrides(ConfigOverrides {
            bucket: self.bucket,
            region: self.region,
            endpoint_url: self.endpoint_url,
            local_root: self.local_root,
            workers: self.jobs,
            naming: self.naming,
            seed: self.seed,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Loads any variables from .env file that are not already set
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    // Capture `log` records from the AWS SDK's dependencies
    tracing_log::LogTracer::init().ok();

    let show_progress = !cli.no_progress;
    let cfg = cli.into_config();
    let result = match cfg.validate() {
        Ok(()) => run(cfg, show_progress).await,
        Err(e) => Err(e.into()),
    };
    if let Err(err) = &result {
        if let Some(e) = err.downcast_ref::<PrepError>().filter(|e| e.is_fatal()) {
            eprintln!("Fatal {} error; no images were processed", e.kind());
        }
    }
    result
}

async fn run(cfg: PrepConfig, show_progress: bool) -> Result<()> {
    let start = Instant::now();
    let store = store_for_config(&cfg)
        .await
        .context("failed to set up object store")?;

    safe_println!("Getting all files present in: {}", store.location());
    let catalog = build_catalog(store.as_ref(), &cfg.processed_prefix).await?;
    safe_println!("Loaded metadata for {} files", catalog.len());

    let categories = catalog.categories();
    safe_println!(
        "There are {} categories: {}",
        categories.len(),
        categories.iter().copied().collect::<Vec<_>>().join(", ")
    );
    safe_println!(
        "There are {} files with unknown formats",
        catalog.unknown_count()
    );

    let retained = catalog.retained();
    safe_println!("Retained {} files with jpg/png names", retained.len());

    safe_println!("Generating data splits");
    let splits = split_catalog(retained, cfg.ratios.validated()?, cfg.seed);
    safe_println!(
        "Train: {}, Test: {}, Validate: {}",
        splits.train.len(),
        splits.test.len(),
        splits.validate.len()
    );

    safe_println!(
        "Downloading, resizing and uploading {} files with {} workers",
        splits.len(),
        cfg.workers
    );
    let namer = Arc::new(Namer::new(cfg.naming, &cfg.processed_prefix));
    let ctx = PipelineContext::new(store.clone(), namer, cfg.transform);
    let progress = if show_progress {
        ItemProgress::new("Processing", splits.len() as u64)
    } else {
        ItemProgress::hidden()
    };
    let orchestrator = Orchestrator::new(ctx, cfg.workers).with_progress(progress);
    let report = orchestrator.run(&splits).await;

    for key in report.uploaded_keys() {
        safe_println!("Uploaded file: {}", key);
    }
    for entry in report.invalid() {
        safe_println!("Invalid image: {}", entry.remote_key);
    }
    for (entry, err) in report.failures() {
        safe_println!("Failed [{}] {}: {}", err.kind(), entry.remote_key, err);
    }

    for (split, s) in report.by_split() {
        safe_println!(
            "{:>8}: {} uploaded, {} invalid, {} failed",
            split.as_str(),
            s.uploaded,
            s.invalid,
            s.failed
        );
    }
    let s = report.summary();
    safe_println!(
        "Finished: {} items, {} uploaded, {} invalid, {} failed in {:.2}s",
        s.total,
        s.uploaded,
        s.invalid,
        s.failed,
        start.elapsed().as_secs_f64()
    );
    Ok(())
}
