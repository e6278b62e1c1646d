use std::sync::Arc;
use std::time::Duration;

use cachet::{CacheError, Settings};
use cachet_backend::CacheBackend;
use cachet_core::{CacheKey, HeaderList};
use http::{HeaderMap, Method};
use tracing::debug;

use crate::key::{header_key, page_key};
use crate::request::CacheableHttpRequest;
use crate::vary::response_vary;

/// Derives and learns cache keys through a store.
///
/// The store only ever holds header lists; pages are cached by the caller
/// under the keys this type returns.
///
/// ```
/// use cachet::Settings;
/// use cachet_http::{CacheNegotiator, CacheableHttpRequest};
/// use cachet_moka::MokaBackend;
/// use http::{HeaderMap, Method, Request};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), cachet::CacheError> {
/// let negotiator = CacheNegotiator::new(MokaBackend::builder().max_entries(1_000).build(), Settings::default());
/// let request = Request::get("/articles/").body(()).unwrap();
/// let request = CacheableHttpRequest::from_request(&request);
///
/// assert!(negotiator.get_cache_key(&request, None, &Method::GET).await?.is_none());
/// let learned = negotiator.learn_cache_key(&request, &HeaderMap::new(), None, None).await?;
/// assert_eq!(negotiator.get_cache_key(&request, None, &Method::GET).await?, Some(learned));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct CacheNegotiator<B> {
    backend: Arc<B>,
    settings: Arc<Settings>,
}

impl<B> Clone for CacheNegotiator<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            settings: Arc::clone(&self.settings),
        }
    }
}

impl<B> CacheNegotiator<B>
where
    B: CacheBackend,
{
    /// Creates a negotiator over `backend`.
    pub fn new(backend: B, settings: Settings) -> Self {
        Self::from_arc(Arc::new(backend), Arc::new(settings))
    }

    /// Creates a negotiator sharing an existing store and settings.
    pub fn from_arc(backend: Arc<B>, settings: Arc<Settings>) -> Self {
        Self { backend, settings }
    }

    /// The store header lists are kept in.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Active settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the page key for `request`, or `None` if no header list has
    /// been learned for its path yet (the page must be generated).
    ///
    /// `key_prefix` defaults to `cache_middleware_key_prefix`. A learned but
    /// empty header list still yields a key.
    pub async fn get_cache_key(
        &self,
        request: &CacheableHttpRequest<'_>,
        key_prefix: Option<&str>,
        method: &Method,
    ) -> Result<Option<CacheKey>, CacheError> {
        let key_prefix = key_prefix.unwrap_or(&self.settings.cache_middleware_key_prefix);
        let registry_key = header_key(request, key_prefix, &self.settings);

        match (*self.backend).get::<HeaderList>(&registry_key).await? {
            Some(header_list) => Ok(Some(page_key(
                request,
                method,
                &header_list,
                key_prefix,
                &self.settings,
            ))),
            None => {
                debug!(key = %registry_key, "no header list learned");
                Ok(None)
            }
        }
    }

    /// Records which request headers the response for `request` varies on
    /// and returns the page key for the request's own method.
    ///
    /// The list comes from the response `Vary` header (empty when absent) and
    /// is stored for `cache_timeout` seconds, by default
    /// `cache_middleware_seconds`.
    pub async fn learn_cache_key(
        &self,
        request: &CacheableHttpRequest<'_>,
        response_headers: &HeaderMap,
        cache_timeout: Option<u64>,
        key_prefix: Option<&str>,
    ) -> Result<CacheKey, CacheError> {
        let key_prefix = key_prefix.unwrap_or(&self.settings.cache_middleware_key_prefix);
        let cache_timeout = cache_timeout.unwrap_or(self.settings.cache_middleware_seconds);
        let registry_key = header_key(request, key_prefix, &self.settings);

        let header_list = response_vary(response_headers).to_header_list();
        debug!(
            key = %registry_key,
            headers = ?header_list,
            timeout = cache_timeout,
            "learned header list"
        );
        (*self.backend)
            .set(
                &registry_key,
                &header_list,
                Some(Duration::from_secs(cache_timeout)),
            )
            .await?;

        Ok(page_key(
            request,
            request.method(),
            &header_list,
            key_prefix,
            &self.settings,
        ))
    }
}
