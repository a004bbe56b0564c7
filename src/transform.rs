// src/transform.rs
//
// Copyright, 2025.  Signal65 / Futurum Group.
//
//! CPU-bound image normalization: sniff, decode, RGB-convert, resize, encode.
//!
//! Everything here is synchronous; the pipeline runs it on the blocking pool.
//! The resize is non-aspect-preserving: every output is exactly
//! `width × height`, so non-square inputs come out stretched.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageError, ImageFormat};
use std::io::Cursor;
use thiserror::Error;

use crate::constants::{DEFAULT_JPEG_QUALITY, TARGET_HEIGHT, TARGET_WIDTH};

/// Output geometry and encoder settings.
#[derive(Debug, Clone, Copy)]
pub struct TransformOptions {
    pub width: u32,
    pub height: u32,
    pub quality: u8,
    pub filter: FilterType,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            width: TARGET_WIDTH,
            height: TARGET_HEIGHT,
            quality: DEFAULT_JPEG_QUALITY,
            filter: FilterType::CatmullRom,
        }
    }
}

/// Result of normalizing one buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    /// JPEG bytes of the resized image.
    Jpeg(Vec<u8>),
    /// Content is not a recognizable image; nothing was decoded.
    Invalid,
}

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("decode as {format:?} failed: {source}")]
    Decode {
        format: ImageFormat,
        #[source]
        source: ImageError,
    },
    #[error("jpeg encode failed: {0}")]
    Encode(#[source] ImageError),
}

/// Identify the image format from magic bytes. The filename is not consulted.
pub fn sniff_format(data: &[u8]) -> Option<ImageFormat> {
    if data.is_empty() {
        return None;
    }
    image::guess_format(data).ok()
}

/// Full normalization of one downloaded object.
pub fn normalize(data: &[u8], opts: &TransformOptions) -> Result<Normalized, TransformError> {
    let Some(format) = sniff_format(data) else {
        return Ok(Normalized::Invalid);
    };

    let decoded = image::load_from_memory_with_format(data, format)
        .map_err(|source| TransformError::Decode { format, source })?;

    // JPEG decodes to L8 or Rgb8, both of which the encoder accepts. Anything
    // else may carry alpha or a palette, which JPEG cannot hold.
    let rgb = if format == ImageFormat::Jpeg {
        decoded
    } else {
        DynamicImage::ImageRgb8(decoded.to_rgb8())
    };

    let resized = rgb.resize_exact(opts.width, opts.height, opts.filter);
    encode_jpeg(&resized, opts.quality).map(Normalized::Jpeg)
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, TransformError> {
    let mut out = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut out, quality);
    img.write_with_encoder(encoder)
        .map_err(TransformError::Encode)?;
    Ok(out.into_inner())
}
