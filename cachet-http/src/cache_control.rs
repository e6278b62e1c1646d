//! `Cache-Control` patching on response headers.

use cachet_core::CacheControl;
use http::header::{CACHE_CONTROL, HeaderMap, HeaderName, HeaderValue};
use tracing::warn;

/// Returns all values of `name` joined with `", "`.
///
/// Bytes are read as ISO-8859-1, so obs-text survives a later [`set_header`]
/// unchanged.
pub(crate) fn joined_header(headers: &HeaderMap, name: &HeaderName) -> Option<String> {
    let mut values = headers
        .get_all(name)
        .iter()
        .map(|value| value.as_bytes().iter().copied().map(char::from));
    let mut joined: String = values.next()?.collect();
    for value in values {
        joined.push_str(", ");
        joined.extend(value);
    }
    Some(joined)
}

/// Replaces `name` with `value`, unless `value` is not a valid header value.
///
/// Characters up to U+00FF are written as single ISO-8859-1 bytes, anything
/// above as UTF-8.
pub(crate) fn set_header(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    let mut bytes = Vec::with_capacity(value.len());
    for c in value.chars() {
        match u8::try_from(c) {
            Ok(byte) => bytes.push(byte),
            Err(_) => bytes.extend_from_slice(c.encode_utf8(&mut [0; 4]).as_bytes()),
        }
    }
    match HeaderValue::from_bytes(&bytes) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(_) => warn!(header = %name, value, "skipping invalid header value"),
    }
}

/// Merges `directives` into the response `Cache-Control` header in place.
///
/// ```
/// use cachet_core::CacheControl;
/// use cachet_http::patch_cache_control;
/// use http::{HeaderMap, HeaderValue, header::CACHE_CONTROL};
///
/// let mut headers = HeaderMap::new();
/// headers.insert(CACHE_CONTROL, HeaderValue::from_static("private, max-age=300"));
///
/// patch_cache_control(&mut headers, CacheControl::new().flag("public").max_age(3600));
/// assert_eq!(headers[CACHE_CONTROL], "max-age=300, public");
/// ```
pub fn patch_cache_control(headers: &mut HeaderMap, directives: CacheControl) {
    let mut cc = joined_header(headers, &CACHE_CONTROL)
        .map(|existing| CacheControl::parse(&existing))
        .unwrap_or_default();
    cc.patch(directives);
    set_header(headers, CACHE_CONTROL, &cc.to_string());
}

/// Returns `max-age` from the `Cache-Control` header.
///
/// `None` when the header is absent, has no `max-age`, or the value is not a
/// non-negative integer.
pub fn get_max_age(headers: &HeaderMap) -> Option<u64> {
    let header = joined_header(headers, &CACHE_CONTROL)?;
    CacheControl::parse(&header).max_age_seconds()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_cc(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn creates_header_when_absent() {
        let mut headers = HeaderMap::new();
        patch_cache_control(
            &mut headers,
            CacheControl::new()
                .flag("no_cache")
                .flag("no_store")
                .flag("must_revalidate")
                .max_age(100),
        );
        assert_eq!(
            headers[CACHE_CONTROL],
            "no-cache, no-store, must-revalidate, max-age=100"
        );
    }

    #[test]
    fn smaller_max_age_wins() {
        let mut headers = with_cc("max-age=100");
        patch_cache_control(&mut headers, CacheControl::new().max_age(3600));
        assert_eq!(get_max_age(&headers), Some(100));

        patch_cache_control(&mut headers, CacheControl::new().max_age(10));
        assert_eq!(get_max_age(&headers), Some(10));
    }

    #[test]
    fn private_and_public_exclude_each_other() {
        let mut headers = with_cc("public, s-maxage=300");
        patch_cache_control(&mut headers, CacheControl::new().flag("private"));
        assert_eq!(headers[CACHE_CONTROL], "s-maxage=300, private");

        patch_cache_control(&mut headers, CacheControl::new().flag("public"));
        assert_eq!(headers[CACHE_CONTROL], "s-maxage=300, public");
    }

    #[test]
    fn split_headers_are_merged() {
        let mut headers = with_cc("no-cache");
        headers.append(CACHE_CONTROL, HeaderValue::from_static("max-age=5"));
        assert_eq!(get_max_age(&headers), Some(5));

        patch_cache_control(&mut headers, CacheControl::new().flag("no-transform"));
        assert_eq!(headers.get_all(CACHE_CONTROL).iter().count(), 1);
        assert_eq!(headers[CACHE_CONTROL], "no-cache, max-age=5, no-transform");
    }

    #[test]
    fn obs_text_is_kept_when_patching() {
        let mut headers = HeaderMap::new();
        headers.insert(
            CACHE_CONTROL,
            HeaderValue::from_bytes(b"private=\"X-F\xf6o\", max-age=5").unwrap(),
        );
        assert_eq!(get_max_age(&headers), Some(5));

        patch_cache_control(&mut headers, CacheControl::new().max_age(100));
        assert_eq!(
            headers[CACHE_CONTROL].as_bytes(),
            b"private=\"X-F\xf6o\", max-age=5"
        );
        assert_eq!(get_max_age(&headers), Some(5));
    }

    #[test]
    fn max_age_lookup_edge_cases() {
        assert_eq!(get_max_age(&HeaderMap::new()), None);
        assert_eq!(get_max_age(&with_cc("public")), None);
        assert_eq!(get_max_age(&with_cc("max-age=later")), None);
        assert_eq!(get_max_age(&with_cc("max-age=-1")), None);
        assert_eq!(get_max_age(&with_cc("Max-Age=7")), Some(7));
    }
}
