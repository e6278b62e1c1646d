use std::{future::Future, sync::Arc, time::Duration};

use async_trait::async_trait;
use cachet_core::{BackendLabel, CacheKey, CacheValue, Raw};
use serde::{Serialize, de::DeserializeOwned};
use tracing::trace;

use crate::{
    BackendError, DeleteStatus,
    format::{Format, FormatExt, JsonFormat},
};

/// Result of a store operation.
pub type BackendResult<T> = Result<T, BackendError>;

/// Raw key-value store.
///
/// Implementations keep bytes under rendered [`CacheKey`]s and must honor the
/// expiry carried by [`CacheValue`]: an entry past its `expire` timestamp is
/// never returned by [`read`](Backend::read).
#[async_trait]
pub trait Backend: Sync + Send {
    /// Reads the entry stored under `key`.
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<CacheValue<Raw>>>;

    /// Stores `value` under `key`, replacing any previous entry and its expiry.
    async fn write(&self, key: &CacheKey, value: CacheValue<Raw>) -> BackendResult<()>;

    /// Removes the entry stored under `key`.
    async fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus>;

    /// Label used in log events.
    fn label(&self) -> BackendLabel {
        BackendLabel::new_static("backend")
    }

    /// Format used to encode typed values.
    fn value_format(&self) -> &dyn Format {
        &JsonFormat
    }
}

#[async_trait]
impl Backend for &dyn Backend {
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<CacheValue<Raw>>> {
        (*self).read(key).await
    }

    async fn write(&self, key: &CacheKey, value: CacheValue<Raw>) -> BackendResult<()> {
        (*self).write(key, value).await
    }

    async fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus> {
        (*self).remove(key).await
    }

    fn label(&self) -> BackendLabel {
        (*self).label()
    }

    fn value_format(&self) -> &dyn Format {
        (*self).value_format()
    }
}

#[async_trait]
impl Backend for Box<dyn Backend> {
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<CacheValue<Raw>>> {
        (**self).read(key).await
    }

    async fn write(&self, key: &CacheKey, value: CacheValue<Raw>) -> BackendResult<()> {
        (**self).write(key, value).await
    }

    async fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus> {
        (**self).remove(key).await
    }

    fn label(&self) -> BackendLabel {
        (**self).label()
    }

    fn value_format(&self) -> &dyn Format {
        (**self).value_format()
    }
}

#[async_trait]
impl Backend for Arc<dyn Backend + Send + 'static> {
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<CacheValue<Raw>>> {
        (**self).read(key).await
    }

    async fn write(&self, key: &CacheKey, value: CacheValue<Raw>) -> BackendResult<()> {
        (**self).write(key, value).await
    }

    async fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus> {
        (**self).remove(key).await
    }

    fn label(&self) -> BackendLabel {
        (**self).label()
    }

    fn value_format(&self) -> &dyn Format {
        (**self).value_format()
    }
}

/// Typed store operations.
///
/// `get` and `set` encode values with the store's [`Format`]. This is the
/// `get(key)` / `set(key, value, ttl)` contract the negotiator relies on.
pub trait CacheBackend: Backend {
    /// Reads and decodes the value stored under `key`.
    fn get<T>(&self, key: &CacheKey) -> impl Future<Output = BackendResult<Option<T>>> + Send
    where
        T: DeserializeOwned + Send,
    {
        async move {
            let label = self.label();
            match self.read(key).await? {
                Some(value) => {
                    trace!(backend = %label, %key, bytes = value.data.len(), "store hit");
                    let decoded = self.value_format().deserialize(&value.data)?;
                    Ok(Some(decoded))
                }
                None => {
                    trace!(backend = %label, %key, "store miss");
                    Ok(None)
                }
            }
        }
    }

    /// Encodes `value` and stores it under `key` for `ttl` (forever if `None`).
    fn set<T>(
        &self,
        key: &CacheKey,
        value: &T,
        ttl: Option<Duration>,
    ) -> impl Future<Output = BackendResult<()>> + Send
    where
        T: Serialize + Sync,
    {
        async move {
            let data = self.value_format().serialize(value)?;
            trace!(backend = %self.label(), %key, bytes = data.len(), ?ttl, "store write");
            self.write(key, CacheValue::with_ttl(data, ttl)).await
        }
    }

    /// Removes the entry stored under `key`.
    fn delete(&self, key: &CacheKey) -> impl Future<Output = BackendResult<DeleteStatus>> + Send {
        async move { self.remove(key).await }
    }
}

impl<B: Backend + ?Sized> CacheBackend for B {}
