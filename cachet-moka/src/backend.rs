//! Moka store implementation.

use async_trait::async_trait;
use cachet_backend::format::{Format, JsonFormat};
use cachet_backend::{Backend, BackendResult, DeleteStatus};
use cachet_core::{BackendLabel, CacheKey, CacheValue, Raw};
use moka::future::Cache;
use tracing::trace;

/// In-memory store powered by Moka.
///
/// # Examples
///
/// ```
/// use cachet_moka::MokaBackend;
///
/// let backend = MokaBackend::builder().max_entries(10_000).build();
/// ```
///
/// # Caveats
///
/// - Data is **not persisted**, it is lost on process restart
/// - Data is **not shared** across processes, use Redis for that
#[derive(Clone)]
pub struct MokaBackend<S = JsonFormat>
where
    S: Format,
{
    /// The underlying Moka async cache instance.
    pub cache: Cache<CacheKey, CacheValue<Raw>>,
    /// Format used to serialize values.
    pub serializer: S,
    /// Label used in log events.
    pub label: BackendLabel,
}

impl<S> std::fmt::Debug for MokaBackend<S>
where
    S: Format,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaBackend")
            .field("label", &self.label)
            .field("entries", &self.cache.entry_count())
            .field("serializer", &self.serializer)
            .finish()
    }
}

impl MokaBackend<JsonFormat> {
    /// Creates a new builder. Capacity must be set before `build()`.
    pub fn builder() -> crate::builder::MokaBackendBuilder<crate::builder::NoCapacity, JsonFormat> {
        crate::builder::MokaBackendBuilder::new()
    }
}

#[async_trait]
impl<S> Backend for MokaBackend<S>
where
    S: Format + Send + Sync,
{
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<CacheValue<Raw>>> {
        let value = self.cache.get(key).await;
        trace!(backend = %self.label, %key, hit = value.is_some(), "moka read");
        Ok(value.filter(|value| !value.is_expired()))
    }

    async fn write(&self, key: &CacheKey, value: CacheValue<Raw>) -> BackendResult<()> {
        self.cache.insert(key.clone(), value).await;
        Ok(())
    }

    async fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus> {
        match self.cache.remove(key).await {
            Some(_) => Ok(DeleteStatus::Deleted(1)),
            None => Ok(DeleteStatus::Missing),
        }
    }

    fn label(&self) -> BackendLabel {
        self.label.clone()
    }

    fn value_format(&self) -> &dyn Format {
        &self.serializer
    }
}
