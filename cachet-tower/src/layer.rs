use std::sync::Arc;

use cachet::Settings;
use cachet_core::{CacheControl, Vary};
use cachet_http::{CacheNegotiator, patch_cache_control, patch_vary_headers};
use http::HeaderMap;
use smol_str::SmolStr;
use tower::Layer;

use crate::future::HeaderPatch;
use crate::service::{CacheHeadersService, LearnCacheKeyService, PatchHeadersService};

/// Merges fixed `Cache-Control` directives into every response.
#[derive(Debug, Clone)]
pub struct CacheControlLayer {
    directives: Arc<CacheControl>,
}

impl CacheControlLayer {
    /// Creates a layer applying `directives`.
    pub fn new(directives: CacheControl) -> Self {
        Self {
            directives: Arc::new(directives),
        }
    }
}

impl HeaderPatch for CacheControl {
    fn apply(&self, headers: &mut HeaderMap) {
        patch_cache_control(headers, self.clone());
    }
}

impl<S> Layer<S> for CacheControlLayer {
    type Service = PatchHeadersService<S, CacheControl>;

    fn layer(&self, inner: S) -> Self::Service {
        PatchHeadersService::new(inner, Arc::clone(&self.directives))
    }
}

/// Adds header names to the `Vary` header of every response.
#[derive(Debug, Clone)]
pub struct VaryOnHeadersLayer {
    headers: Arc<Vary>,
}

impl VaryOnHeadersLayer {
    /// Creates a layer varying on `headers`.
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vary = Vary::new();
        vary.extend(headers);
        Self {
            headers: Arc::new(vary),
        }
    }
}

impl HeaderPatch for Vary {
    fn apply(&self, headers: &mut HeaderMap) {
        patch_vary_headers(headers, self.headers());
    }
}

impl<S> Layer<S> for VaryOnHeadersLayer {
    type Service = PatchHeadersService<S, Vary>;

    fn layer(&self, inner: S) -> Self::Service {
        PatchHeadersService::new(inner, Arc::clone(&self.headers))
    }
}

/// Adds `ETag`, `Last-Modified`, `Expires` and `max-age` to every response.
///
/// The body is buffered so the `ETag` can be computed.
#[derive(Debug, Clone)]
pub struct CacheHeadersLayer {
    settings: Arc<Settings>,
    timeout: Option<i64>,
}

impl CacheHeadersLayer {
    /// Uses `cache_middleware_seconds` as the timeout.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Arc::new(settings),
            timeout: None,
        }
    }

    /// Marks every response as never cacheable.
    pub fn never_cache(settings: Settings) -> Self {
        Self::new(settings).timeout(-1)
    }

    /// Overrides the timeout in seconds; negative values count as zero.
    pub fn timeout(mut self, seconds: i64) -> Self {
        self.timeout = Some(seconds);
        self
    }
}

impl<S> Layer<S> for CacheHeadersLayer {
    type Service = CacheHeadersService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CacheHeadersService::new(inner, Arc::clone(&self.settings), self.timeout)
    }
}

/// Learns the cache key of successful `GET`/`HEAD` responses.
///
/// The key is attached to the response as a
/// [`LearnedCacheKey`](crate::LearnedCacheKey) extension so an outer layer can
/// store the page under it.
pub struct LearnCacheKeyLayer<B> {
    negotiator: CacheNegotiator<B>,
    timeout: Option<u64>,
    key_prefix: Option<SmolStr>,
}

impl<B> LearnCacheKeyLayer<B> {
    /// Creates a layer learning keys through `negotiator`.
    pub fn new(negotiator: CacheNegotiator<B>) -> Self {
        Self {
            negotiator,
            timeout: None,
            key_prefix: None,
        }
    }

    /// Timeout for learned header lists when the response has no `max-age`.
    pub fn timeout(mut self, seconds: u64) -> Self {
        self.timeout = Some(seconds);
        self
    }

    /// Overrides `cache_middleware_key_prefix`.
    pub fn key_prefix(mut self, prefix: impl Into<SmolStr>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }
}

impl<B> Clone for LearnCacheKeyLayer<B> {
    fn clone(&self) -> Self {
        Self {
            negotiator: self.negotiator.clone(),
            timeout: self.timeout,
            key_prefix: self.key_prefix.clone(),
        }
    }
}

impl<S, B> Layer<S> for LearnCacheKeyLayer<B> {
    type Service = LearnCacheKeyService<S, B>;

    fn layer(&self, inner: S) -> Self::Service {
        LearnCacheKeyService::new(
            inner,
            self.negotiator.clone(),
            self.timeout,
            self.key_prefix.clone(),
        )
    }
}
