// tests/test_pipeline.rs
//
// Single-item pipeline behaviour against an in-memory store.

mod common;

use common::{MemoryStore, jpeg_bytes, jpeg_shape, rgba_png_bytes};
use s3imgprep::{
    CatalogEntry, Namer, NamingMode, PipelineContext, PipelineResult, PrepError, Split,
    TransformOptions, process_item,
};
use std::sync::Arc;
use std::sync::atomic::Ordering;

fn context(store: Arc<MemoryStore>, mode: NamingMode) -> PipelineContext {
    PipelineContext::new(
        store,
        Arc::new(Namer::new(mode, "processed")),
        TransformOptions::default(),
    )
}

fn entry(key: &str) -> CatalogEntry {
    CatalogEntry::from_key(key).unwrap()
}

#[tokio::test]
async fn jpeg_is_resized_and_uploaded() {
    let store = Arc::new(MemoryStore::new());
    store.insert("cats/big.jpg", jpeg_bytes(1024, 768));
    let ctx = context(store.clone(), NamingMode::Sequential);

    let result = process_item(&ctx, &entry("cats/big.jpg"), Split::Train).await;
    let key = match result {
        PipelineResult::Uploaded(key) => key,
        other => panic!("expected upload, got {other:?}"),
    };
    assert_eq!(key, "processed/cats/train/img1.jpg");

    let out = store.object(&key).expect("output object exists");
    let (w, h, _) = jpeg_shape(&out);
    assert_eq!((w, h), (300, 300));
}

#[tokio::test]
async fn rgba_png_becomes_three_channel_jpeg() {
    let store = Arc::new(MemoryStore::new());
    store.insert("birds/parrot.png", rgba_png_bytes(500, 200));
    let ctx = context(store.clone(), NamingMode::Original);

    let result = process_item(&ctx, &entry("birds/parrot.png"), Split::Validate).await;
    assert_eq!(result.output_key(), Some("processed/birds/validate/parrot.jpg"));

    let out = store.object("processed/birds/validate/parrot.jpg").unwrap();
    assert_eq!(jpeg_shape(&out), (300, 300, 3));
}

#[tokio::test]
async fn content_wins_over_filename() {
    // PNG bytes behind a .jpg name still take the non-JPEG path.
    let store = Arc::new(MemoryStore::new());
    store.insert("cats/liar.jpg", rgba_png_bytes(50, 50));
    let ctx = context(store.clone(), NamingMode::Sequential);

    let result = process_item(&ctx, &entry("cats/liar.jpg"), Split::Test).await;
    assert!(result.is_uploaded());
    let out = store.object("processed/cats/test/img1.jpg").unwrap();
    assert_eq!(jpeg_shape(&out), (300, 300, 3));
}

#[tokio::test]
async fn unrecognized_bytes_are_invalid_and_not_uploaded() {
    let store = Arc::new(MemoryStore::new());
    store.insert("cats/empty.jpg", Vec::new());
    store.insert("cats/text.png", b"definitely not pixels".to_vec());
    store.insert("cats/stub.png", b"\x89PNG".to_vec());
    let ctx = context(store.clone(), NamingMode::Sequential);

    for key in ["cats/empty.jpg", "cats/text.png", "cats/stub.png"] {
        let result = process_item(&ctx, &entry(key), Split::Train).await;
        assert!(matches!(result, PipelineResult::Invalid), "{key}: {result:?}");
    }
    assert_eq!(store.put_calls.load(Ordering::SeqCst), 0);
    assert!(store.keys_with_prefix("processed/").is_empty());
    // Invalid items do not consume sequence numbers.
    assert_eq!(ctx.namer.counter().claimed("cats"), 0);
}

#[tokio::test]
async fn missing_object_is_a_download_failure() {
    let store = Arc::new(MemoryStore::new());
    let ctx = context(store.clone(), NamingMode::Sequential);

    let result = process_item(&ctx, &entry("cats/gone.jpg"), Split::Train).await;
    match result.error() {
        Some(PrepError::Download { key, .. }) => assert_eq!(key, "cats/gone.jpg"),
        other => panic!("expected download failure, got {other:?}"),
    }
    assert_eq!(store.put_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn truncated_image_is_a_decode_failure() {
    let store = Arc::new(MemoryStore::new());
    let mut bytes = rgba_png_bytes(64, 64);
    bytes.truncate(45);
    store.insert("cats/cut.png", bytes);
    let ctx = context(store.clone(), NamingMode::Sequential);

    let result = process_item(&ctx, &entry("cats/cut.png"), Split::Train).await;
    assert!(matches!(result.error(), Some(PrepError::Decode { .. })), "{result:?}");
    assert_eq!(store.put_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn rejected_put_is_an_upload_failure() {
    let store = Arc::new(MemoryStore::new());
    store.insert("cats/a.jpg", jpeg_bytes(20, 20));
    store.fail_put_prefix("processed/cats/");
    let ctx = context(store.clone(), NamingMode::Sequential);

    let result = process_item(&ctx, &entry("cats/a.jpg"), Split::Train).await;
    match result.error() {
        Some(PrepError::Upload { key, .. }) => assert_eq!(key, "processed/cats/train/img1.jpg"),
        other => panic!("expected upload failure, got {other:?}"),
    }
}
