//! Store descriptions.

use std::sync::Arc;

use cachet_backend::Backend as BackendTrait;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A configured store, tagged by `type`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Backend {
    Moka(BackendConfig<Moka>),
    Redis(BackendConfig<Redis>),
}

impl Backend {
    /// Builds the store. `alias` is used as its label unless one is set.
    pub fn into_backend(
        self,
        alias: &str,
    ) -> Result<Arc<dyn BackendTrait + Send + 'static>, ConfigError> {
        match self {
            Backend::Moka(config) => config.into_backend(alias),
            Backend::Redis(config) => config.into_backend(alias),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct BackendConfig<T> {
    #[serde(default)]
    pub value: ValueFormat,
    #[serde(flatten)]
    pub backend: T,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ValueFormat {
    pub format: ValueSerialization,
}

/// Encoding of stored header lists.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum ValueSerialization {
    #[default]
    Json,
    Ron,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Moka {
    pub max_capacity: u64,
    /// Label used in log events, defaults to the alias.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Redis {
    pub connection_string: String,
    /// Label used in log events, defaults to the alias.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl BackendConfig<Moka> {
    #[cfg(feature = "moka")]
    pub fn into_backend(
        self,
        alias: &str,
    ) -> Result<Arc<dyn BackendTrait + Send + 'static>, ConfigError> {
        use cachet_backend::{JsonFormat, RonFormat};
        use cachet_moka::MokaBackend;

        let label = self.backend.label.unwrap_or_else(|| alias.to_string());
        let builder = MokaBackend::builder()
            .max_entries(self.backend.max_capacity)
            .label(label);

        Ok(match self.value.format {
            ValueSerialization::Json => Arc::new(builder.value_format(JsonFormat).build()),
            ValueSerialization::Ron => Arc::new(builder.value_format(RonFormat).build()),
        })
    }

    #[cfg(not(feature = "moka"))]
    pub fn into_backend(
        self,
        _alias: &str,
    ) -> Result<Arc<dyn BackendTrait + Send + 'static>, ConfigError> {
        Err(ConfigError::BackendNotAvailable("Moka".to_string()))
    }
}

impl BackendConfig<Redis> {
    #[cfg(feature = "redis")]
    pub fn into_backend(
        self,
        alias: &str,
    ) -> Result<Arc<dyn BackendTrait + Send + 'static>, ConfigError> {
        use cachet_backend::{BackendError, JsonFormat, RonFormat};
        use cachet_redis::RedisBackend;

        let label = self.backend.label.unwrap_or_else(|| alias.to_string());
        let builder = RedisBackend::builder()
            .server(self.backend.connection_string)
            .label(label);

        Ok(match self.value.format {
            ValueSerialization::Json => Arc::new(
                builder
                    .value_format(JsonFormat)
                    .build()
                    .map_err(BackendError::from)?,
            ),
            ValueSerialization::Ron => Arc::new(
                builder
                    .value_format(RonFormat)
                    .build()
                    .map_err(BackendError::from)?,
            ),
        })
    }

    #[cfg(not(feature = "redis"))]
    pub fn into_backend(
        self,
        _alias: &str,
    ) -> Result<Arc<dyn BackendTrait + Send + 'static>, ConfigError> {
        Err(ConfigError::BackendNotAvailable("Redis".to_string()))
    }
}
