#![warn(missing_docs)]
//! # cachet-core
//!
//! Core types for the cachet cache header negotiation toolkit.
//!
//! This crate is **protocol-agnostic**: it knows nothing about request or
//! response objects. It provides the value types that the HTTP layer
//! (`cachet-http`) and the store adapters (`cachet-moka`, `cachet-redis`)
//! share:
//!
//! - **Directives** of a `Cache-Control` header ([`CacheControl`], [`Directive`])
//! - **Vary** header lists and the request-metadata names derived from them
//!   ([`Vary`], [`HeaderList`])
//! - **Keys** under which header lists and pages are stored ([`CacheKey`], [`KeyParts`])
//! - **Values** with an absolute expiry used by stores to honor TTLs ([`CacheValue`])
//! - HTTP date formatting and MD5 checksums used for keys and ETags

pub mod cache_control;
pub mod checksum;
pub mod date;
pub mod key;
pub mod label;
pub mod value;
pub mod vary;

pub use cache_control::{CacheControl, Directive, normalize_directive_name};
pub use checksum::{Checksum, md5_hex};
pub use date::http_date;
pub use key::{CacheKey, KeyParts};
pub use label::BackendLabel;
#[doc(hidden)]
pub use smol_str::SmolStr;
pub use value::CacheValue;
pub use vary::{HeaderList, Vary, header_tokens, meta_name};

/// Raw byte data type used for serialized cache values.
/// Using `Bytes` provides efficient zero-copy cloning via reference counting.
pub type Raw = bytes::Bytes;
