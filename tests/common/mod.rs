// tests/common/mod.rs
//
// Common test utilities: an in-memory ObjectStore and image fixtures.

#![allow(dead_code)]

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use bytes::Bytes;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb, Rgba};
use std::collections::{BTreeMap, HashSet};
use std::io::Cursor;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use s3imgprep::{ListPage, ObjectStore};

/// Bucket held in a `BTreeMap`, with switches for injecting failures.
pub struct MemoryStore {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    page_size: usize,
    fail_gets: Mutex<HashSet<String>>,
    fail_puts: Mutex<HashSet<String>>,
    panic_gets: Mutex<HashSet<String>>,
    fail_listing: bool,
    get_delay: Option<Duration>,
    pub list_calls: AtomicUsize,
    pub put_calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_page_size(1000)
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            objects: Mutex::new(BTreeMap::new()),
            page_size,
            fail_gets: Mutex::new(HashSet::new()),
            fail_puts: Mutex::new(HashSet::new()),
            panic_gets: Mutex::new(HashSet::new()),
            fail_listing: false,
            get_delay: None,
            list_calls: AtomicUsize::new(0),
            put_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn failing_listing() -> Self {
        Self {
            fail_listing: true,
            ..Self::new()
        }
    }

    /// Hold every GET for `delay` so concurrent workers overlap.
    pub fn with_get_delay(mut self, delay: Duration) -> Self {
        self.get_delay = Some(delay);
        self
    }

    pub fn insert(&self, key: &str, data: Vec<u8>) {
        self.objects.lock().unwrap().insert(key.to_string(), data);
    }

    pub fn fail_get(&self, key: &str) {
        self.fail_gets.lock().unwrap().insert(key.to_string());
    }

    /// Make GET of `key` panic, as a buggy backend or decoder would.
    pub fn panic_on_get(&self, key: &str) {
        self.panic_gets.lock().unwrap().insert(key.to_string());
    }

    pub fn fail_put_prefix(&self, prefix: &str) {
        self.fail_puts.lock().unwrap().insert(prefix.to_string());
    }

    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.objects
            .lock()
            .unwrap()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    fn location(&self) -> &str {
        "memory"
    }

    async fn list_page(&self, continuation: Option<String>) -> Result<ListPage> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_listing {
            bail!("AccessDenied: listing disabled");
        }
        let offset: usize = continuation.map(|t| t.parse()).transpose()?.unwrap_or(0);
        let keys: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
        let end = (offset + self.page_size).min(keys.len());
        Ok(ListPage {
            keys: keys[offset.min(end)..end].to_vec(),
            next_continuation: (end < keys.len()).then(|| end.to_string()),
        })
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.get_delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let should_panic = self.panic_gets.lock().unwrap().contains(key);
        if should_panic {
            panic!("backend bug while fetching {key}");
        }
        if self.fail_gets.lock().unwrap().contains(key) {
            bail!("connection reset while fetching {key}");
        }
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .map(Bytes::from)
            .ok_or_else(|| anyhow!("NoSuchKey: {key}"))
    }

    async fn put(&self, key: &str, data: Vec<u8>) -> Result<()> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_puts.lock().unwrap().iter().any(|p| key.starts_with(p)) {
            bail!("SlowDown: put rejected for {key}");
        }
        self.objects.lock().unwrap().insert(key.to_string(), data);
        Ok(())
    }
}

fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = ImageBuffer::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 90]));
    encode(&DynamicImage::ImageRgb8(img), ImageFormat::Jpeg)
}

pub fn rgba_png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = ImageBuffer::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, 40, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    encode(&DynamicImage::ImageRgba8(img), ImageFormat::Png)
}

/// Decode `bytes` as JPEG and return `(width, height, channels)`.
pub fn jpeg_shape(bytes: &[u8]) -> (u32, u32, u8) {
    assert_eq!(image::guess_format(bytes).unwrap(), ImageFormat::Jpeg);
    let img = image::load_from_memory_with_format(bytes, ImageFormat::Jpeg).unwrap();
    (img.width(), img.height(), img.color().channel_count())
}
