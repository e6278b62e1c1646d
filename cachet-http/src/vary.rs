//! `Vary` header maintenance.

use cachet_core::Vary;
use http::header::{HeaderMap, VARY};

use crate::cache_control::{joined_header, set_header};

/// Appends header names to the response `Vary` header.
///
/// Names already listed (compared case-insensitively) are left alone, so
/// existing order and casing survive.
///
/// ```
/// use cachet_http::patch_vary_headers;
/// use http::{HeaderMap, HeaderValue, header::VARY};
///
/// let mut headers = HeaderMap::new();
/// headers.insert(VARY, HeaderValue::from_static("Accept-Language"));
/// patch_vary_headers(&mut headers, ["Cookie", "accept-language"]);
/// assert_eq!(headers[VARY], "Accept-Language, Cookie");
/// ```
pub fn patch_vary_headers<I, S>(headers: &mut HeaderMap, new_headers: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut vary = response_vary(headers);
    vary.extend(new_headers);
    set_header(headers, VARY, &vary.to_string());
}

/// Returns `true` if the response varies on `header` (case-insensitive).
pub fn has_vary_header(headers: &HeaderMap, header: &str) -> bool {
    response_vary(headers).contains(header)
}

/// Parses the response `Vary` header; empty when absent.
pub fn response_vary(headers: &HeaderMap) -> Vary {
    joined_header(headers, &VARY)
        .map(|value| Vary::parse(&value))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn creates_header_when_absent() {
        let mut headers = HeaderMap::new();
        patch_vary_headers(&mut headers, ["Accept-Encoding", "Cookie"]);
        assert_eq!(headers[VARY], "Accept-Encoding, Cookie");
    }

    #[test]
    fn patching_twice_is_stable() {
        let mut headers = HeaderMap::new();
        headers.insert(VARY, HeaderValue::from_static("Cookie"));
        patch_vary_headers(&mut headers, ["Accept-Encoding"]);
        patch_vary_headers(&mut headers, ["accept-encoding", "COOKIE"]);
        assert_eq!(headers[VARY], "Cookie, Accept-Encoding");
    }

    #[test]
    fn membership_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        assert!(!has_vary_header(&headers, "Cookie"));

        headers.insert(VARY, HeaderValue::from_static("Accept-Encoding,  COOKIE"));
        assert!(has_vary_header(&headers, "cookie"));
        assert!(has_vary_header(&headers, "ACCEPT-ENCODING"));
        assert!(!has_vary_header(&headers, "Accept"));
    }

    #[test]
    fn obs_text_names_survive_patching() {
        let mut headers = HeaderMap::new();
        headers.insert(VARY, HeaderValue::from_bytes(b"Accept-Language, X-\xe9").unwrap());
        assert!(has_vary_header(&headers, "accept-language"));

        patch_vary_headers(&mut headers, ["Cookie"]);
        assert_eq!(headers[VARY].as_bytes(), b"Accept-Language, X-\xe9, Cookie");
        assert!(response_vary(&headers).contains("Cookie"));
        assert!(has_vary_header(&headers, "Accept-Language"));
    }
}
