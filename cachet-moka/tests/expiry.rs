use std::time::Duration;

use bytes::Bytes;
use cachet_backend::{Backend, CacheBackend, DeleteStatus};
use cachet_core::{CacheKey, CacheValue, HeaderList};
use cachet_moka::MokaBackend;
use chrono::Utc;

fn key(id: &str) -> CacheKey {
    CacheKey::new("cache_header", vec!["".into(), id.into()])
}

#[tokio::test]
async fn typed_round_trip() {
    let backend = MokaBackend::builder().max_entries(100).build();
    let headers = HeaderList::new(["HTTP_ACCEPT_ENCODING"]);

    backend
        .set(&key("a"), &headers, Some(Duration::from_secs(600)))
        .await
        .unwrap();

    let restored: Option<HeaderList> = backend.get(&key("a")).await.unwrap();
    assert_eq!(restored, Some(headers));
}

#[tokio::test]
async fn expired_entry_is_not_returned() {
    let backend = MokaBackend::builder().max_entries(100).build();
    let expired = CacheValue::new(
        Bytes::from_static(b"[]"),
        Some(Utc::now() - chrono::Duration::seconds(1)),
    );
    backend.write(&key("old"), expired).await.unwrap();

    assert!(backend.read(&key("old")).await.unwrap().is_none());
}

#[tokio::test]
async fn zero_ttl_expires_immediately() {
    let backend = MokaBackend::builder().max_entries(100).build();
    backend
        .set(&key("zero"), &HeaderList::default(), Some(Duration::ZERO))
        .await
        .unwrap();

    let restored: Option<HeaderList> = backend.get(&key("zero")).await.unwrap();
    assert_eq!(restored, None);
}

#[tokio::test]
async fn rewrite_replaces_expiry() {
    let backend = MokaBackend::builder().max_bytes(1024 * 1024).build();
    backend
        .set(&key("b"), &HeaderList::default(), Some(Duration::from_secs(1)))
        .await
        .unwrap();
    backend
        .set(&key("b"), &HeaderList::default(), Some(Duration::from_secs(3600)))
        .await
        .unwrap();

    let raw = backend.read(&key("b")).await.unwrap().unwrap();
    assert!(raw.ttl().unwrap() > Duration::from_secs(60));
}

#[tokio::test]
async fn remove_reports_status() {
    let backend = MokaBackend::builder().label("headers").max_entries(10).build();
    backend.set(&key("c"), &HeaderList::default(), None).await.unwrap();

    assert_eq!(backend.label().as_str(), "headers");
    assert_eq!(backend.remove(&key("c")).await.unwrap(), DeleteStatus::Deleted(1));
    assert_eq!(backend.remove(&key("c")).await.unwrap(), DeleteStatus::Missing);
}
