//! Redis store for cachet.
//!
//! Entries are plain Redis strings written with `SET key value PX ttl`, so
//! header registry entries are visible to (and can be shared with) any other
//! process reading the same keys.
#![warn(missing_docs)]

pub mod backend;
pub mod error;

#[doc(inline)]
pub use crate::backend::{RedisBackend, RedisBackendBuilder};
#[doc(inline)]
pub use crate::error::Error;
