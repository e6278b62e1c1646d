//! Traits and structs for cachet store interaction.
//!
//! The negotiator never talks to a concrete store. It goes through
//! [`Backend`] for raw bytes and [`CacheBackend`] for typed values; adapters
//! such as `cachet-moka` and `cachet-redis` implement the former and get the
//! latter for free.
mod backend;
mod error;
pub mod format;

pub use backend::{Backend, BackendResult, CacheBackend};
pub use error::{BackendError, DeleteStatus};
pub use format::{FormatError, JsonFormat, RonFormat};
