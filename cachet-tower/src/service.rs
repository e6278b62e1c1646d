use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use cachet::Settings;
use cachet_backend::CacheBackend;
use cachet_core::CacheKey;
use cachet_http::{
    ActiveTimezone, CacheNegotiator, CacheableHttpRequest, CacheableHttpResponse, LanguageCode,
    get_max_age, patch_response_headers,
};
use futures::future::BoxFuture;
use http::{Method, Request, Response, StatusCode};
use http_body::Body as HttpBody;
use http_body_util::{BodyExt, Full};
use smol_str::SmolStr;
use tower::{BoxError, Service};
use tracing::{debug, warn};

use crate::future::{HeaderPatch, PatchHeadersFuture};

/// Applies a [`HeaderPatch`] to every response of the inner service.
#[derive(Debug)]
pub struct PatchHeadersService<S, P> {
    inner: S,
    patch: Arc<P>,
}

impl<S, P> PatchHeadersService<S, P> {
    /// Wraps `inner`.
    pub fn new(inner: S, patch: Arc<P>) -> Self {
        Self { inner, patch }
    }
}

impl<S: Clone, P> Clone for PatchHeadersService<S, P> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            patch: Arc::clone(&self.patch),
        }
    }
}

impl<S, P, ReqBody, ResBody> Service<Request<ReqBody>> for PatchHeadersService<S, P>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    P: HeaderPatch,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = PatchHeadersFuture<S::Future, P>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        PatchHeadersFuture::new(self.inner.call(req), Arc::clone(&self.patch))
    }
}

/// Buffers the response body and runs response enrichment on it.
#[derive(Debug)]
pub struct CacheHeadersService<S> {
    inner: S,
    settings: Arc<Settings>,
    timeout: Option<i64>,
}

impl<S> CacheHeadersService<S> {
    /// Wraps `inner`.
    pub fn new(inner: S, settings: Arc<Settings>, timeout: Option<i64>) -> Self {
        Self {
            inner,
            settings,
            timeout,
        }
    }
}

impl<S: Clone> Clone for CacheHeadersService<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            settings: Arc::clone(&self.settings),
            timeout: self.timeout,
        }
    }
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for CacheHeadersService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Future: Send + 'static,
    S::Error: Into<BoxError>,
    ResBody: HttpBody + Send + 'static,
    ResBody::Data: Send,
    ResBody::Error: Into<BoxError>,
{
    type Response = Response<Full<Bytes>>;
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(Into::into)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let settings = Arc::clone(&self.settings);
        let timeout = self.timeout;
        let upstream = self.inner.call(req);

        Box::pin(async move {
            let (parts, body) = upstream.await.map_err(Into::<BoxError>::into)?.into_parts();
            let body = body.collect().await.map_err(Into::<BoxError>::into)?.to_bytes();

            let mut response = CacheableHttpResponse::from_response(Response::from_parts(parts, body));
            patch_response_headers(&mut response, timeout, &settings);
            Ok(response.into_response().map(Full::new))
        })
    }
}

/// Response extension carrying the key learned for the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearnedCacheKey(pub CacheKey);

/// Learns cache keys from successful `GET`/`HEAD` responses.
///
/// The header list is stored for the response `max-age` when it has one, else
/// for the configured timeout. A `max-age=0` response is not learned. Store
/// failures are logged and the response is passed on without a key.
pub struct LearnCacheKeyService<S, B> {
    inner: S,
    negotiator: CacheNegotiator<B>,
    timeout: Option<u64>,
    key_prefix: Option<SmolStr>,
}

impl<S, B> LearnCacheKeyService<S, B> {
    /// Wraps `inner`.
    pub fn new(
        inner: S,
        negotiator: CacheNegotiator<B>,
        timeout: Option<u64>,
        key_prefix: Option<SmolStr>,
    ) -> Self {
        Self {
            inner,
            negotiator,
            timeout,
            key_prefix,
        }
    }
}

impl<S: Clone, B> Clone for LearnCacheKeyService<S, B> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            negotiator: self.negotiator.clone(),
            timeout: self.timeout,
            key_prefix: self.key_prefix.clone(),
        }
    }
}

/// Copies what key derivation reads from a request that is about to be
/// handed to the inner service.
fn key_request<B>(request: &Request<B>) -> Request<()> {
    let mut snapshot = Request::new(());
    *snapshot.method_mut() = request.method().clone();
    *snapshot.uri_mut() = request.uri().clone();
    *snapshot.headers_mut() = request.headers().clone();
    if let Some(language) = request.extensions().get::<LanguageCode>() {
        snapshot.extensions_mut().insert(language.clone());
    }
    if let Some(timezone) = request.extensions().get::<ActiveTimezone>() {
        snapshot.extensions_mut().insert(timezone.clone());
    }
    snapshot
}

impl<S, B, ReqBody, ResBody> Service<Request<ReqBody>> for LearnCacheKeyService<S, B>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Future: Send + 'static,
    S::Error: Send,
    B: CacheBackend + Send + Sync + 'static,
    ResBody: Send + 'static,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let learnable = req.method() == Method::GET || req.method() == Method::HEAD;
        let snapshot = learnable.then(|| key_request(&req));
        let negotiator = self.negotiator.clone();
        let default_timeout = self.timeout;
        let key_prefix = self.key_prefix.clone();
        let upstream = self.inner.call(req);

        Box::pin(async move {
            let mut response = upstream.await?;
            let Some(snapshot) = snapshot else {
                return Ok(response);
            };
            if response.status() != StatusCode::OK {
                return Ok(response);
            }

            let timeout = match get_max_age(response.headers()) {
                Some(0) => {
                    debug!("max-age=0 response, not learning a cache key");
                    return Ok(response);
                }
                Some(max_age) => Some(max_age),
                None => default_timeout,
            };

            let request = CacheableHttpRequest::from_request(&snapshot);
            let learned = negotiator
                .learn_cache_key(&request, response.headers(), timeout, key_prefix.as_deref())
                .await;
            match learned {
                Ok(key) => {
                    response.extensions_mut().insert(LearnedCacheKey(key));
                }
                Err(error) => warn!(%error, "failed to learn cache key"),
            }
            Ok(response)
        })
    }
}
