use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use cachet::Settings;
use cachet_core::{http_date, md5_hex};
use cachet_http::{
    CacheableHttpResponse, add_never_cache_headers, get_max_age, patch_response_headers,
    patch_response_headers_at,
};
use chrono::{Duration, TimeZone, Utc};
use http::header::{CACHE_CONTROL, ETAG, EXPIRES, LAST_MODIFIED};
use http::{HeaderValue, Response};
use pretty_assertions::assert_eq;

fn etag_settings() -> Settings {
    Settings {
        use_etags: true,
        ..Settings::default()
    }
}

fn response(body: &'static str) -> CacheableHttpResponse {
    CacheableHttpResponse::from_response(Response::new(Bytes::from_static(body.as_bytes())))
}

#[test]
fn adds_all_headers_with_explicit_time() {
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    let mut response = response("content");

    patch_response_headers_at(&mut response, Some(300), &etag_settings(), now);

    let headers = response.headers();
    assert_eq!(headers[ETAG], format!("\"{}\"", md5_hex("content")).as_str());
    assert_eq!(headers[LAST_MODIFIED], "Fri, 01 Mar 2024 12:00:00 GMT");
    assert_eq!(headers[EXPIRES], "Fri, 01 Mar 2024 12:05:00 GMT");
    assert_eq!(headers[CACHE_CONTROL], "max-age=300");
}

#[test]
fn enrichment_is_idempotent() {
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    let settings = etag_settings();
    let mut response = response("content");

    patch_response_headers_at(&mut response, None, &settings, now);
    let first = response.headers().clone();
    patch_response_headers_at(&mut response, None, &settings, now + Duration::seconds(30));

    assert_eq!(response.headers(), &first);
    assert_eq!(get_max_age(response.headers()), Some(600));
}

#[test]
fn existing_headers_are_kept() {
    let mut response = response("content");
    let headers = response.headers_mut();
    headers.insert(ETAG, HeaderValue::from_static("\"v1\""));
    headers.insert(LAST_MODIFIED, HeaderValue::from_static("Mon, 01 Jan 2024 00:00:00 GMT"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("public, max-age=60"));

    patch_response_headers(&mut response, Some(3600), &etag_settings());

    let headers = response.headers();
    assert_eq!(headers[ETAG], "\"v1\"");
    assert_eq!(headers[LAST_MODIFIED], "Mon, 01 Jan 2024 00:00:00 GMT");
    assert_eq!(headers[CACHE_CONTROL], "public, max-age=60");
    assert!(headers.contains_key(EXPIRES));
}

#[test]
fn etag_only_when_enabled() {
    let mut response = response("content");
    patch_response_headers(&mut response, None, &Settings::default());
    assert!(!response.headers().contains_key(ETAG));
}

#[test]
fn never_cache_clamps_to_zero() {
    let mut response = response("content");
    add_never_cache_headers(&mut response, &Settings::default());

    assert_eq!(response.headers()[CACHE_CONTROL], "max-age=0");
    assert_eq!(response.headers()[EXPIRES], response.headers()[LAST_MODIFIED]);
}

#[test]
fn negative_timeout_is_zero() {
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    let mut response = response("content");
    patch_response_headers_at(&mut response, Some(-30), &Settings::default(), now);

    assert_eq!(get_max_age(response.headers()), Some(0));
    assert_eq!(response.headers()[EXPIRES], http_date(now).as_str());
}

#[test]
fn deferred_etag_is_computed_once_at_render() {
    let renders = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&renders);
    let (parts, ()) = Response::new(()).into_parts();
    let mut response = CacheableHttpResponse::deferred(parts, move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Bytes::from_static(b"rendered later")
    });

    patch_response_headers(&mut response, None, &etag_settings());
    assert_eq!(renders.load(Ordering::SeqCst), 0);
    assert!(!response.headers().contains_key(ETAG));
    assert!(response.headers().contains_key(CACHE_CONTROL));

    response.render();
    response.render();
    let response = response.into_response();

    assert_eq!(renders.load(Ordering::SeqCst), 1);
    assert_eq!(
        response.headers()[ETAG],
        format!("\"{}\"", md5_hex("rendered later")).as_str()
    );
}
