//! Tower middleware applying cachet header negotiation to any HTTP service.
//!
//! | Layer | Effect on responses |
//! |-------|---------------------|
//! | [`CacheControlLayer`] | merges fixed `Cache-Control` directives |
//! | [`VaryOnHeadersLayer`] | appends names to `Vary` |
//! | [`CacheHeadersLayer`] | adds `ETag`, `Last-Modified`, `Expires`, `max-age` |
//! | [`CacheHeadersLayer::never_cache`] | marks the response as not cacheable |
//! | [`LearnCacheKeyLayer`] | learns the cache key of successful `GET`/`HEAD` responses |
//!
//! ```
//! use cachet::Settings;
//! use cachet_core::CacheControl;
//! use cachet_tower::{CacheControlLayer, CacheHeadersLayer, VaryOnHeadersLayer};
//! use tower::ServiceBuilder;
//!
//! let layers = ServiceBuilder::new()
//!     .layer(CacheHeadersLayer::new(Settings::default()))
//!     .layer(VaryOnHeadersLayer::new(["Accept-Encoding"]))
//!     .layer(CacheControlLayer::new(CacheControl::new().flag("public")));
//! # let _ = layers;
//! ```
#![warn(missing_docs)]

/// Future types for the header services.
pub mod future;
/// Tower layers.
pub mod layer;
/// Tower services performing the header work.
pub mod service;

pub use layer::{CacheControlLayer, CacheHeadersLayer, LearnCacheKeyLayer, VaryOnHeadersLayer};
pub use service::{CacheHeadersService, LearnCacheKeyService, LearnedCacheKey, PatchHeadersService};
