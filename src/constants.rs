// src/constants.rs
//
// Copyright, 2025.  Signal65 / Futurum Group.
//
// Centralized constants for s3imgprep to avoid hardcoded values throughout the codebase

/// Bucket used when neither `--bucket` nor `S3IMGPREP_BUCKET` is given
pub const DEFAULT_BUCKET: &str = "nanonets-platform-task";

/// Region fallback when the SDK provider chain finds nothing
pub const DEFAULT_REGION: &str = "us-west-2";

/// Top-level key segment that holds processed output; never listed as a category
pub const PROCESSED_PREFIX: &str = "processed";

/// Number of items processed concurrently
pub const DEFAULT_WORKERS: usize = 10;

/// Output image width in pixels
pub const TARGET_WIDTH: u32 = 300;

/// Output image height in pixels
pub const TARGET_HEIGHT: u32 = 300;

/// JPEG quality used when re-encoding (same default as most imaging libraries)
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// Fraction of the shuffled catalog assigned to the train split
pub const TRAIN_RATIO: f64 = 0.7;

/// Fraction of the shuffled catalog assigned to the test split
pub const TEST_RATIO: f64 = 0.2;

/// Fraction of the shuffled catalog assigned to the validate split
pub const VALIDATE_RATIO: f64 = 0.1;

/// Keys returned per page by the file-backed store
pub const DEFAULT_LIST_PAGE_SIZE: usize = 1000;

/// Connect timeout for the S3 client (seconds)
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Environment variable overriding the bucket name
pub const ENV_BUCKET: &str = "S3IMGPREP_BUCKET";

/// Environment variable overriding the worker pool size
pub const ENV_WORKERS: &str = "S3IMGPREP_JOBS";
