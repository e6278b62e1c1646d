//! Cache header negotiation over [`http`] requests and responses.
//!
//! Two families of helpers live here:
//!
//! - header patching on responses: [`patch_cache_control`],
//!   [`patch_vary_headers`], [`patch_response_headers`] and friends
//! - cache key derivation through a store: [`CacheNegotiator::learn_cache_key`]
//!   records which request headers a page varies on, and
//!   [`CacheNegotiator::get_cache_key`] later turns a request into the key of
//!   the matching cached variant
//!
//! ```
//! use cachet_http::{patch_vary_headers, has_vary_header};
//! use http::HeaderMap;
//!
//! let mut headers = HeaderMap::new();
//! patch_vary_headers(&mut headers, ["Accept-Encoding"]);
//! assert!(has_vary_header(&headers, "accept-encoding"));
//! ```
pub mod cache_control;
pub mod headers;
pub mod key;
mod negotiator;
mod request;
mod response;
pub mod vary;

pub use cache_control::{get_max_age, patch_cache_control};
pub use headers::{add_never_cache_headers, patch_response_headers, patch_response_headers_at};
pub use negotiator::CacheNegotiator;
pub use request::{ActiveTimezone, CacheableHttpRequest, LanguageCode};
pub use response::{CacheableHttpResponse, PostRenderCallback, Renderer};
pub use vary::{has_vary_header, patch_vary_headers};
