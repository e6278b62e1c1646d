use std::borrow::Cow;

use cachet::Settings;
use http::{Extensions, HeaderMap, Method, Request, Uri, request::Parts};
use smol_str::SmolStr;

const META_PREFIX: &str = "HTTP_";

/// Language selected for the request, set by locale middleware.
///
/// Overrides `Settings::language_code` when present in the request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageCode(pub SmolStr);

/// Timezone activated for the request.
///
/// Overrides `Settings::time_zone` when present in the request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveTimezone(pub SmolStr);

/// Read-only view of the request data keys are derived from.
///
/// Borrowing keeps the negotiator usable from middleware that must hand the
/// request on unchanged.
#[derive(Debug, Clone, Copy)]
pub struct CacheableHttpRequest<'a> {
    method: &'a Method,
    uri: &'a Uri,
    headers: &'a HeaderMap,
    extensions: &'a Extensions,
}

impl<'a> CacheableHttpRequest<'a> {
    /// Borrows the parts of a request.
    pub fn from_parts(parts: &'a Parts) -> Self {
        Self {
            method: &parts.method,
            uri: &parts.uri,
            headers: &parts.headers,
            extensions: &parts.extensions,
        }
    }

    /// Borrows a full request; the body is not looked at.
    pub fn from_request<B>(request: &'a Request<B>) -> Self {
        Self {
            method: request.method(),
            uri: request.uri(),
            headers: request.headers(),
            extensions: request.extensions(),
        }
    }

    /// Request method.
    pub fn method(&self) -> &Method {
        self.method
    }

    /// Request headers.
    pub fn headers(&self) -> &HeaderMap {
        self.headers
    }

    /// Path plus query string, e.g. `/articles/?page=2`.
    pub fn full_path(&self) -> Cow<'a, str> {
        match self.uri.query() {
            Some(query) => Cow::Owned(format!("{}?{}", self.uri.path(), query)),
            None => Cow::Borrowed(self.uri.path()),
        }
    }

    /// Looks up request metadata by name, as raw header bytes.
    ///
    /// `HTTP_ACCEPT_ENCODING` resolves to the `Accept-Encoding` header.
    /// Repeated headers are joined with `,`. Values are returned byte for
    /// byte, obs-text included.
    pub fn meta(&self, name: &str) -> Option<Vec<u8>> {
        let header = name.strip_prefix(META_PREFIX)?.replace('_', "-");
        let mut values = self.headers.get_all(header.as_str()).iter();
        let mut joined = values.next()?.as_bytes().to_vec();
        for value in values {
            joined.push(b',');
            joined.extend_from_slice(value.as_bytes());
        }
        Some(joined)
    }

    /// Active language: the [`LanguageCode`] extension, else the configured default.
    pub fn language_code<'s>(&'s self, settings: &'s Settings) -> &'s str {
        self.extensions
            .get::<LanguageCode>()
            .map(|code| code.0.as_str())
            .unwrap_or(&settings.language_code)
    }

    /// Active timezone name: the [`ActiveTimezone`] extension, else the configured default.
    pub fn timezone_name<'s>(&'s self, settings: &'s Settings) -> &'s str {
        self.extensions
            .get::<ActiveTimezone>()
            .map(|tz| tz.0.as_str())
            .unwrap_or(&settings.time_zone)
    }
}

impl<'a> From<&'a Parts> for CacheableHttpRequest<'a> {
    fn from(parts: &'a Parts) -> Self {
        Self::from_parts(parts)
    }
}

impl<'a, B> From<&'a Request<B>> for CacheableHttpRequest<'a> {
    fn from(request: &'a Request<B>) -> Self {
        Self::from_request(request)
    }
}
