//! Error types for store operations.

use crate::format::FormatError;
use thiserror::Error;

/// Error type for store operations.
///
/// Groups the failures of a store round trip so callers can tell a broken
/// connection from undecodable data.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Internal store error, state or computation error.
    ///
    /// Any error not related to network interaction.
    #[error(transparent)]
    InternalError(Box<dyn std::error::Error + Send>),

    /// Network interaction error.
    ///
    /// Errors occurring during communication with remote stores (e.g., Redis).
    #[error(transparent)]
    ConnectionError(Box<dyn std::error::Error + Send>),

    /// Serialization or deserialization error.
    #[error(transparent)]
    FormatError(#[from] FormatError),
}

/// Outcome of a remove call.
#[derive(Debug, PartialEq, Eq)]
pub enum DeleteStatus {
    /// Record deleted.
    Deleted(u32),
    /// Record already missing.
    Missing,
}
