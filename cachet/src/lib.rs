#![warn(missing_docs)]
//! # cachet
//!
//! Cache header negotiation for HTTP services.
//!
//! The negotiator answers two questions for a response cache sitting in
//! front of an application:
//!
//! - under which key is the cached variant of *this* request stored, given
//!   the headers the page was learned to vary on?
//! - which `Cache-Control`, `Vary`, `ETag`, `Last-Modified` and `Expires`
//!   headers should the response carry?
//!
//! This crate holds the shared pieces: the recognized [`Settings`], the
//! [`CacheError`] returned by store-backed operations and re-exports of the
//! core types. The HTTP implementation lives in `cachet-http`, tower layers
//! in `cachet-tower`.

/// Store contract re-exports.
pub mod backend;

/// Recognized configuration options.
pub mod config;

/// Error type for store-backed negotiation.
pub mod error;

pub use config::Settings;
pub use error::CacheError;

pub use cachet_core::{
    BackendLabel, CacheControl, CacheKey, CacheValue, Directive, HeaderList, KeyParts, Raw, Vary,
};
