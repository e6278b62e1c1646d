//! Cache key derivation.
//!
//! Two keys exist per cached path:
//!
//! - the **header key** `cache_header.<prefix>.<md5(full path)>` stores the
//!   [`HeaderList`] learned from the response `Vary` header
//! - the **page key** `cache_page.<prefix>.<method>.<md5(full path)>.<md5(values)>`
//!   identifies one variant, where `values` are the request's values of the
//!   learned headers, hashed in list order
//!
//! Both get a locale suffix (`.<language>`) when i18n or l10n is on and a
//! timezone suffix (`.<timezone>`) when tz support is on.

use cachet::Settings;
use cachet_core::{CacheKey, Checksum, HeaderList, KeyParts, md5_hex};
use http::Method;
use tracing::trace;

use crate::request::CacheableHttpRequest;

/// Namespace of header registry keys.
pub const HEADER_NAMESPACE: &str = "cache_header";

/// Namespace of page keys.
pub const PAGE_NAMESPACE: &str = "cache_page";

/// Key under which the header list for the request path is stored.
pub fn header_key(request: &CacheableHttpRequest<'_>, key_prefix: &str, settings: &Settings) -> CacheKey {
    let mut parts = KeyParts::new(HEADER_NAMESPACE);
    parts.push(key_prefix);
    parts.push(md5_hex(request.full_path().as_bytes()));
    push_suffix(&mut parts, request, settings);
    parts.into_cache_key()
}

/// Key of the page variant selected by the request's values of `header_list`.
///
/// Headers missing from the request contribute nothing to the values hash.
pub fn page_key(
    request: &CacheableHttpRequest<'_>,
    method: &Method,
    header_list: &HeaderList,
    key_prefix: &str,
    settings: &Settings,
) -> CacheKey {
    let mut values = Checksum::new();
    for name in header_list.iter() {
        if let Some(value) = request.meta(name) {
            values.update(value);
        }
    }

    let mut parts = KeyParts::new(PAGE_NAMESPACE);
    parts.push(key_prefix);
    parts.push(method.as_str());
    parts.push(md5_hex(request.full_path().as_bytes()));
    parts.push(values.hexdigest());
    push_suffix(&mut parts, request, settings);
    let key = parts.into_cache_key();
    trace!(%key, headers = header_list.len(), "derived page key");
    key
}

/// Makes a timezone name safe for keys: non-ASCII characters are dropped and
/// spaces become underscores.
///
/// ```
/// use cachet_http::key::sanitize_timezone;
///
/// assert_eq!(sanitize_timezone("Hora de verano de Sudamérica"), "Hora_de_verano_de_Sudamrica");
/// ```
pub fn sanitize_timezone(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii)
        .map(|c| if c == ' ' { '_' } else { c })
        .collect()
}

fn push_suffix(parts: &mut KeyParts, request: &CacheableHttpRequest<'_>, settings: &Settings) {
    if settings.localized_keys() {
        parts.push(request.language_code(settings));
    }
    if settings.use_tz {
        parts.push(sanitize_timezone(request.timezone_name(settings)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{ActiveTimezone, LanguageCode};
    use http::{HeaderValue, Request};

    fn bare_settings() -> Settings {
        Settings {
            use_i18n: false,
            ..Settings::default()
        }
    }

    #[test]
    fn header_key_layout() {
        let request = Request::get("/").body(()).unwrap();
        let view = CacheableHttpRequest::from_request(&request);
        let key = header_key(&view, "", &bare_settings());
        assert_eq!(key.as_str(), format!("cache_header..{}", md5_hex("/")));
    }

    #[test]
    fn page_key_layout_with_empty_list() {
        let request = Request::get("/a/?q=1").body(()).unwrap();
        let view = CacheableHttpRequest::from_request(&request);
        let key = page_key(&view, &Method::HEAD, &HeaderList::default(), "site", &bare_settings());
        assert_eq!(
            key.as_str(),
            format!(
                "cache_page.site.HEAD.{}.d41d8cd98f00b204e9800998ecf8427e",
                md5_hex("/a/?q=1")
            )
        );
    }

    #[test]
    fn values_hash_follows_list_order_and_skips_missing() {
        let request = Request::get("/")
            .header("Accept-Encoding", "gzip")
            .header("Accept-Language", "de")
            .body(())
            .unwrap();
        let view = CacheableHttpRequest::from_request(&request);
        let list = HeaderList::new(["HTTP_ACCEPT_LANGUAGE", "HTTP_COOKIE", "HTTP_ACCEPT_ENCODING"]);

        let key = page_key(&view, &Method::GET, &list, "", &bare_settings());
        assert_eq!(key.parts().nth(3), Some(md5_hex("degzip").as_str()));
    }

    #[test]
    fn raw_header_bytes_select_distinct_variants() {
        let list = HeaderList::new(["HTTP_COOKIE"]);
        let key_for = |cookie: &'static [u8]| {
            let request = Request::get("/")
                .header("Cookie", HeaderValue::from_bytes(cookie).unwrap())
                .body(())
                .unwrap();
            let view = CacheableHttpRequest::from_request(&request);
            page_key(&view, &Method::GET, &list, "", &bare_settings())
        };

        let jorg = key_for(b"user=J\xf6rg");
        let max = key_for(b"user=M\xe4x");
        assert_ne!(jorg, max);
        assert_eq!(jorg.parts().nth(3), Some(md5_hex(b"user=J\xf6rg").as_str()));
    }

    #[test]
    fn suffixes_follow_settings_and_extensions() {
        let mut request = Request::get("/").body(()).unwrap();
        request.extensions_mut().insert(LanguageCode("pt-br".into()));
        request
            .extensions_mut()
            .insert(ActiveTimezone("Hora de verano de Sudamérica".into()));
        let view = CacheableHttpRequest::from_request(&request);

        let settings = Settings {
            use_tz: true,
            ..Settings::default()
        };
        let key = header_key(&view, "p", &settings);
        assert!(
            key.as_str().ends_with(".pt-br.Hora_de_verano_de_Sudamrica"),
            "{key}"
        );

        let settings = Settings {
            use_i18n: false,
            use_l10n: true,
            ..Settings::default()
        };
        assert!(header_key(&view, "p", &settings).as_str().ends_with(".pt-br"));
        assert!(!header_key(&view, "p", &bare_settings()).as_str().contains("pt-br"));
    }
}
