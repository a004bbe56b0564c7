// src/s3_client.rs
//
// Copyright, 2025.  Signal65 / Futurum Group.
//
//! Explicit construction of the AWS S3 client.
//!
//! There is no process-wide client: `build_s3_client` is called once per run
//! and the resulting handle is passed to `S3ObjectStore`, which every worker
//! shares. Credentials come from the SDK's default provider chain.

use anyhow::{Context, Result};
use aws_config::meta::region::RegionProviderChain;
use aws_config::timeout::TimeoutConfig;
use aws_sdk_s3::{Client, config::Region};
use aws_smithy_http_client::tls;
use aws_smithy_http_client::tls::rustls_provider::CryptoMode;
use std::path::Path;
use std::{env, fs, time::Duration};
use tracing::{debug, info};

use crate::config::PrepConfig;
use crate::constants::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_REGION};

// -----------------------------------------------------------------------------
// TLS helper, for CA bundle
// -----------------------------------------------------------------------------

/// Create a TLS context using a CA bundle file
fn tls_context_from_pem(filename: impl AsRef<Path>) -> Result<tls::TlsContext> {
    let pem_contents = fs::read(&filename).with_context(|| {
        format!(
            "Failed to read CA bundle file: {}",
            filename.as_ref().display()
        )
    })?;

    let trust_store = tls::TrustStore::empty().with_pem_certificate(pem_contents.as_slice());

    tls::TlsContext::builder()
        .with_trust_store(trust_store)
        .build()
        .with_context(|| {
            format!(
                "Failed to build TLS context from PEM {}",
                filename.as_ref().display()
            )
        })
}

/// Build an S3 client from `cfg`.
///
/// Region resolution: `cfg.region`, then the SDK default chain, then
/// [`DEFAULT_REGION`]. A custom endpoint switches on path-style addressing,
/// which S3-compatible services (MinIO, Ceph) require.
pub async fn build_s3_client(cfg: &PrepConfig) -> Result<Client> {
    let region = RegionProviderChain::first_try(cfg.region.clone().map(Region::new))
        .or_default_provider()
        .or_else(Region::new(DEFAULT_REGION));

    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest()).region(region);

    if let Some(endpoint) = cfg.endpoint_url.as_deref().filter(|e| !e.is_empty()) {
        debug!("Using custom S3 endpoint {}", endpoint);
        loader = loader.endpoint_url(endpoint);
    }

    if let Ok(ca_bundle_path) = env::var("AWS_CA_BUNDLE_PATH") {
        if !ca_bundle_path.is_empty() {
            info!("Loading CA bundle from: {}", ca_bundle_path);
            let tls_context = tls_context_from_pem(&ca_bundle_path)?;
            let http_client = aws_smithy_http_client::Builder::new()
                .tls_provider(tls::Provider::Rustls(CryptoMode::AwsLc))
                .tls_context(tls_context)
                .build_https();
            loader = loader.http_client(http_client);
        }
    }

    // No operation timeout: a hung transfer holds its worker slot until the
    // connection itself gives up.
    let timeout_config = TimeoutConfig::builder()
        .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
        .build();

    let sdk_config = loader.timeout_config(timeout_config).load().await;

    let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
        .force_path_style(cfg.endpoint_url.is_some())
        .build();
    Ok(Client::from_conf(s3_config))
}
