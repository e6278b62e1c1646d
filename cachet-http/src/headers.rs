//! Response enrichment: `ETag`, `Last-Modified`, `Expires`, `Cache-Control`.

use bytes::Bytes;
use cachet::Settings;
use cachet_core::{CacheControl, md5_hex};
use chrono::{DateTime, Utc};
use http::header::{ETAG, EXPIRES, HeaderMap, LAST_MODIFIED};
use http::response::Parts;
use tracing::trace;

use crate::cache_control::{patch_cache_control, set_header};
use crate::response::CacheableHttpResponse;

/// Adds caching headers to `response`, each only if it is not already set.
///
/// `cache_timeout` is in seconds and defaults to
/// `Settings::cache_middleware_seconds`; negative values count as zero.
///
/// - `ETag` (when `use_etags` is on): quoted MD5 of the body. A deferred
///   response gets it from a post-render callback instead of rendering now.
/// - `Last-Modified`: now.
/// - `Expires`: now plus the timeout.
/// - `Cache-Control`: always patched with `max-age=<timeout>`, so an existing
///   smaller `max-age` is kept.
pub fn patch_response_headers(
    response: &mut CacheableHttpResponse,
    cache_timeout: Option<i64>,
    settings: &Settings,
) {
    patch_response_headers_at(response, cache_timeout, settings, Utc::now())
}

/// [`patch_response_headers`] with an explicit current time.
pub fn patch_response_headers_at(
    response: &mut CacheableHttpResponse,
    cache_timeout: Option<i64>,
    settings: &Settings,
    now: DateTime<Utc>,
) {
    let timeout = cache_timeout
        .map(|timeout| u64::try_from(timeout).unwrap_or(0))
        .unwrap_or(settings.cache_middleware_seconds);

    if settings.use_etags && !response.headers().contains_key(ETAG) {
        if response.is_rendered() {
            let body = response.render();
            set_etag(response.headers_mut(), &body);
        } else {
            trace!("deferring ETag until the response is rendered");
            response.add_post_render_callback(|parts: &mut Parts, body: &Bytes| {
                set_etag(&mut parts.headers, body)
            });
        }
    }

    let headers = response.headers_mut();
    if !headers.contains_key(LAST_MODIFIED) {
        set_header(headers, LAST_MODIFIED, &cachet_core::http_date(now));
    }
    if !headers.contains_key(EXPIRES) {
        let expires = i64::try_from(timeout)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        set_header(headers, EXPIRES, &cachet_core::http_date(expires));
    }
    patch_cache_control(headers, CacheControl::new().max_age(timeout));
}

/// Marks `response` as never cacheable: `max-age=0` and `Expires` of now.
pub fn add_never_cache_headers(response: &mut CacheableHttpResponse, settings: &Settings) {
    patch_response_headers(response, Some(-1), settings)
}

fn set_etag(headers: &mut HeaderMap, body: &Bytes) {
    set_header(headers, ETAG, &format!("\"{}\"", md5_hex(body)));
}
