use std::sync::Arc;

use cachet::Settings;
use cachet_backend::Backend as BackendTrait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backend::Backend;
use crate::error::ConfigError;

/// Settings plus named stores.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub caches: IndexMap<String, Backend>,
}

impl Config {
    /// Parses a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_saphyr::from_str(yaml).map_err(|error| ConfigError::Yaml(error.to_string()))
    }

    /// Renders the configuration back to YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_saphyr::to_string(self).map_err(|error| ConfigError::Yaml(error.to_string()))
    }

    /// Store configured under `alias`.
    pub fn cache(&self, alias: &str) -> Result<&Backend, ConfigError> {
        self.caches
            .get(alias)
            .ok_or_else(|| ConfigError::UnknownAlias(alias.to_string()))
    }

    /// Builds the store named by `settings.cache_middleware_alias`.
    pub fn backend(&self) -> Result<Arc<dyn BackendTrait + Send + 'static>, ConfigError> {
        let alias = &self.settings.cache_middleware_alias;
        debug!(alias = %alias, "building cache store");
        self.cache(alias)?.clone().into_backend(alias)
    }
}
