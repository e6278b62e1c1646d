//! Redis store implementation.

use async_trait::async_trait;
use bytes::Bytes;
use cachet_backend::{
    Backend, BackendError, BackendResult, DeleteStatus,
    format::{Format, JsonFormat},
};
use cachet_core::{BackendLabel, CacheKey, CacheValue, Raw};
use chrono::Utc;
use redis::{Client, aio::ConnectionManager};
use tokio::sync::OnceCell;
use tracing::trace;

use crate::error::Error;

/// Redis store based on the redis-rs crate.
///
/// Uses a [`ConnectionManager`] that is created on first use and reconnects
/// on its own afterwards.
///
/// ```no_run
/// use cachet_redis::RedisBackend;
///
/// let backend = RedisBackend::builder()
///     .server("redis://127.0.0.1:6379/0")
///     .label("shared")
///     .build()
///     .unwrap();
/// ```
///
/// [`ConnectionManager`]: redis::aio::ConnectionManager
#[derive(Clone)]
pub struct RedisBackend<S = JsonFormat>
where
    S: Format,
{
    client: Client,
    connection: OnceCell<ConnectionManager>,
    serializer: S,
    label: BackendLabel,
}

impl RedisBackend<JsonFormat> {
    /// Creates a store connected to `redis://127.0.0.1/`.
    pub fn new() -> Result<Self, BackendError> {
        Ok(Self::builder().build()?)
    }

    /// Creates a new builder with default settings.
    #[must_use]
    pub fn builder() -> RedisBackendBuilder<JsonFormat> {
        RedisBackendBuilder::default()
    }
}

impl<S> RedisBackend<S>
where
    S: Format,
{
    /// Lazily connects and returns the shared [`ConnectionManager`].
    pub async fn connection(&self) -> Result<&ConnectionManager, BackendError> {
        let manager = self
            .connection
            .get_or_try_init(|| {
                trace!(backend = %self.label, "initialize redis connection manager");
                self.client.get_connection_manager()
            })
            .await
            .map_err(Error::from)?;
        Ok(manager)
    }
}

impl<S> std::fmt::Debug for RedisBackend<S>
where
    S: Format,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisBackend")
            .field("label", &self.label)
            .field("connected", &self.connection.initialized())
            .field("serializer", &self.serializer)
            .finish()
    }
}

/// Builder for [`RedisBackend`].
pub struct RedisBackendBuilder<S = JsonFormat>
where
    S: Format,
{
    connection_info: String,
    serializer: S,
    label: BackendLabel,
}

impl Default for RedisBackendBuilder<JsonFormat> {
    fn default() -> Self {
        Self {
            connection_info: "redis://127.0.0.1/".to_owned(),
            serializer: JsonFormat,
            label: BackendLabel::new_static("redis"),
        }
    }
}

impl<S> RedisBackendBuilder<S>
where
    S: Format,
{
    /// Sets connection info (host, port, database, etc.).
    pub fn server(mut self, connection_info: impl Into<String>) -> Self {
        self.connection_info = connection_info.into();
        self
    }

    /// Sets the value serialization format.
    pub fn value_format<NewS>(self, serializer: NewS) -> RedisBackendBuilder<NewS>
    where
        NewS: Format,
    {
        RedisBackendBuilder {
            connection_info: self.connection_info,
            serializer,
            label: self.label,
        }
    }

    /// Sets the label used in log events.
    pub fn label(mut self, label: impl Into<BackendLabel>) -> Self {
        self.label = label.into();
        self
    }

    /// Creates the store. No connection is made until the first command.
    pub fn build(self) -> Result<RedisBackend<S>, Error> {
        Ok(RedisBackend {
            client: Client::open(self.connection_info)?,
            connection: OnceCell::new(),
            serializer: self.serializer,
            label: self.label,
        })
    }
}

#[async_trait]
impl<S> Backend for RedisBackend<S>
where
    S: Format + Send + Sync,
{
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<CacheValue<Raw>>> {
        let mut con = self.connection().await?.clone();

        // PTTL: -2 if the key is missing, -1 if it has no TTL, else milliseconds
        let (data, pttl): (Option<Vec<u8>>, i64) = redis::pipe()
            .cmd("GET")
            .arg(key.as_str())
            .cmd("PTTL")
            .arg(key.as_str())
            .query_async(&mut con)
            .await
            .map_err(Error::from)?;
        trace!(backend = %self.label, %key, hit = data.is_some(), pttl, "redis read");

        let Some(data) = data else {
            return Ok(None);
        };
        let expire = (pttl > 0).then(|| Utc::now() + chrono::Duration::milliseconds(pttl));
        Ok(Some(CacheValue::new(Bytes::from(data), expire)))
    }

    async fn write(&self, key: &CacheKey, value: CacheValue<Raw>) -> BackendResult<()> {
        let mut con = self.connection().await?.clone();

        let mut cmd = redis::cmd("SET");
        cmd.arg(key.as_str()).arg(value.data.as_ref());
        if let Some(ttl) = value.ttl() {
            let millis = ttl.as_millis();
            if millis == 0 {
                // Redis rejects a zero expiry; the entry is already stale.
                let _: i64 = redis::cmd("DEL")
                    .arg(key.as_str())
                    .query_async(&mut con)
                    .await
                    .map_err(Error::from)?;
                return Ok(());
            }
            cmd.arg("PX").arg(u64::try_from(millis).unwrap_or(u64::MAX));
        }

        cmd.query_async::<()>(&mut con)
            .await
            .map_err(Error::from)?;
        Ok(())
    }

    async fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus> {
        let mut con = self.connection().await?.clone();

        let deleted: u32 = redis::cmd("DEL")
            .arg(key.as_str())
            .query_async(&mut con)
            .await
            .map_err(Error::from)?;

        if deleted > 0 {
            Ok(DeleteStatus::Deleted(deleted))
        } else {
            Ok(DeleteStatus::Missing)
        }
    }

    fn label(&self) -> BackendLabel {
        self.label.clone()
    }

    fn value_format(&self) -> &dyn Format {
        &self.serializer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_url_fails_at_build() {
        let result = RedisBackend::builder().server("not a redis url").build();
        assert!(matches!(result, Err(Error::Redis(_))));
    }

    #[test]
    fn build_does_not_connect() {
        let backend = RedisBackend::builder()
            .server("redis://127.0.0.1:1/")
            .label("shared")
            .build()
            .unwrap();
        assert_eq!(backend.label().as_str(), "shared");
        assert!(!backend.connection.initialized());
    }
}
