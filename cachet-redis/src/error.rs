//! Error types for Redis store operations.
//!
//! All errors convert into [`BackendError`] so the negotiator handles every
//! store the same way.
//!
//! [`BackendError`]: cachet_backend::BackendError

use cachet_backend::BackendError;
use redis::RedisError;

/// Error type for Redis store operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An error from the underlying Redis client.
    ///
    /// Covers invalid connection URLs, unreachable servers (the connection is
    /// established lazily on first use) and command failures.
    #[error("Redis backend error: {0}")]
    Redis(#[from] RedisError),
}

impl From<Error> for BackendError {
    fn from(error: Error) -> Self {
        Self::InternalError(Box::new(error))
    }
}
