use std::convert::Infallible;

use bytes::Bytes;
use cachet::Settings;
use cachet_core::{CacheControl, md5_hex};
use cachet_http::{CacheNegotiator, CacheableHttpRequest, get_max_age};
use cachet_moka::MokaBackend;
use cachet_tower::{
    CacheControlLayer, CacheHeadersLayer, LearnCacheKeyLayer, LearnedCacheKey,
    VaryOnHeadersLayer,
};
use http::header::{CACHE_CONTROL, ETAG, EXPIRES, LAST_MODIFIED, VARY};
use http::{Method, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use pretty_assertions::assert_eq;
use tower::{Layer, ServiceExt, service_fn};

async fn handler(_request: Request<Full<Bytes>>) -> Result<Response<Full<Bytes>>, Infallible> {
    Ok(Response::builder()
        .header(CACHE_CONTROL, "max-age=600")
        .header(VARY, "Cookie")
        .body(Full::new(Bytes::from_static(b"hello")))
        .unwrap())
}

fn request(method: Method, path: &str) -> Request<Full<Bytes>> {
    Request::builder()
        .method(method)
        .uri(path)
        .header("Accept-Encoding", "gzip")
        .body(Full::default())
        .unwrap()
}

fn negotiator() -> CacheNegotiator<MokaBackend> {
    CacheNegotiator::new(
        MokaBackend::builder().max_entries(100).build(),
        Settings::default(),
    )
}

#[tokio::test]
async fn cache_control_layer_merges_directives() {
    let service = CacheControlLayer::new(CacheControl::new().flag("private").max_age(60))
        .layer(service_fn(handler));

    let response = service.oneshot(request(Method::GET, "/")).await.unwrap();

    assert_eq!(response.headers()[CACHE_CONTROL], "max-age=60, private");
}

#[tokio::test]
async fn vary_layer_appends_missing_names() {
    let service =
        VaryOnHeadersLayer::new(["cookie", "Accept-Encoding"]).layer(service_fn(handler));

    let response = service.oneshot(request(Method::GET, "/")).await.unwrap();

    assert_eq!(response.headers()[VARY], "Cookie, Accept-Encoding");
}

#[tokio::test]
async fn headers_layer_enriches_buffered_response() {
    let settings = Settings {
        use_etags: true,
        ..Settings::default()
    };
    let service = CacheHeadersLayer::new(settings)
        .timeout(60)
        .layer(service_fn(handler));

    let response = service.oneshot(request(Method::GET, "/")).await.unwrap();
    let (parts, body) = response.into_parts();

    assert_eq!(parts.headers[ETAG], format!("\"{}\"", md5_hex("hello")).as_str());
    assert!(parts.headers.contains_key(LAST_MODIFIED));
    assert!(parts.headers.contains_key(EXPIRES));
    assert_eq!(get_max_age(&parts.headers), Some(60));
    assert_eq!(body.collect().await.unwrap().to_bytes(), "hello");
}

#[tokio::test]
async fn never_cache_layer_zeroes_max_age() {
    let service = CacheHeadersLayer::never_cache(Settings::default()).layer(service_fn(handler));

    let response = service.oneshot(request(Method::GET, "/")).await.unwrap();

    assert_eq!(get_max_age(response.headers()), Some(0));
    assert_eq!(response.headers()[EXPIRES], response.headers()[LAST_MODIFIED]);
}

#[tokio::test]
async fn learn_layer_records_key_for_get() {
    let negotiator = negotiator();
    let service = LearnCacheKeyLayer::new(negotiator.clone()).layer(service_fn(handler));

    let response = service
        .oneshot(request(Method::GET, "/articles/"))
        .await
        .unwrap();
    let learned = response.extensions().get::<LearnedCacheKey>().cloned();

    let lookup = request(Method::GET, "/articles/");
    let lookup = CacheableHttpRequest::from_request(&lookup);
    let found = negotiator
        .get_cache_key(&lookup, None, &Method::GET)
        .await
        .unwrap();

    assert!(learned.is_some());
    assert_eq!(learned.map(|key| key.0), found);
}

#[tokio::test]
async fn learn_layer_skips_other_methods() {
    let negotiator = negotiator();
    let service = LearnCacheKeyLayer::new(negotiator.clone()).layer(service_fn(handler));

    let response = service
        .oneshot(request(Method::POST, "/articles/"))
        .await
        .unwrap();
    assert!(response.extensions().get::<LearnedCacheKey>().is_none());

    let lookup = request(Method::GET, "/articles/");
    let lookup = CacheableHttpRequest::from_request(&lookup);
    let found = negotiator
        .get_cache_key(&lookup, None, &Method::GET)
        .await
        .unwrap();
    assert_eq!(found, None);
}

#[tokio::test]
async fn learn_layer_skips_errors_and_zero_max_age() {
    let negotiator = negotiator();

    let not_found = LearnCacheKeyLayer::new(negotiator.clone()).layer(service_fn(
        |_request: Request<Full<Bytes>>| async {
            Ok::<_, Infallible>(
                Response::builder()
                    .status(StatusCode::NOT_FOUND)
                    .body(Full::<Bytes>::default())
                    .unwrap(),
            )
        },
    ));
    let response = not_found
        .oneshot(request(Method::GET, "/missing/"))
        .await
        .unwrap();
    assert!(response.extensions().get::<LearnedCacheKey>().is_none());

    let uncacheable = LearnCacheKeyLayer::new(negotiator.clone()).layer(service_fn(
        |_request: Request<Full<Bytes>>| async {
            Ok::<_, Infallible>(
                Response::builder()
                    .header(CACHE_CONTROL, "max-age=0")
                    .body(Full::<Bytes>::default())
                    .unwrap(),
            )
        },
    ));
    let response = uncacheable
        .oneshot(request(Method::GET, "/private/"))
        .await
        .unwrap();
    assert!(response.extensions().get::<LearnedCacheKey>().is_none());
}

#[tokio::test]
async fn learn_layer_uses_key_prefix() {
    let service = LearnCacheKeyLayer::new(negotiator())
        .key_prefix("site")
        .timeout(30)
        .layer(service_fn(handler));

    let response = service
        .oneshot(request(Method::HEAD, "/articles/"))
        .await
        .unwrap();
    let learned = response.extensions().get::<LearnedCacheKey>().unwrap();

    assert_eq!(
        learned.0.as_str(),
        format!(
            "cache_page.site.HEAD.{}.{}.en-us",
            md5_hex("/articles/"),
            md5_hex("")
        )
    );
}
