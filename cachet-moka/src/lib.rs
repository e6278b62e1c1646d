//! In-memory store for cachet, backed by [`moka`].
//!
//! Entries expire individually at the timestamp carried by their
//! [`CacheValue`](cachet_core::CacheValue), so a header list written with a
//! 600 second timeout disappears 600 seconds later regardless of capacity.
#![warn(missing_docs)]

mod backend;
mod builder;

pub use backend::MokaBackend;
pub use builder::{ByteCapacity, EntryCapacity, MokaBackendBuilder, NoCapacity};
pub use moka::policy::EvictionPolicy;
