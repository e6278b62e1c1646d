use cachet_backend::BackendError;
use thiserror::Error;

/// Error returned by store-backed negotiation.
///
/// Header manipulation never fails; only the store round trips of
/// `get_cache_key` and `learn_cache_key` do.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The store failed to read or write the header registry.
    #[error("cache store error: {0}")]
    Backend(#[from] BackendError),
}
