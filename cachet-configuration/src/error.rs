use cachet_backend::BackendError;
use thiserror::Error;

/// Errors raised while loading configuration or building stores from it.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The document is not valid YAML or does not match the schema.
    #[error("invalid configuration: {0}")]
    Yaml(String),

    /// No store is configured under the requested alias.
    #[error("no cache configured under alias `{0}`")]
    UnknownAlias(String),

    /// The store type was compiled out.
    #[error("backend not available: {0}")]
    BackendNotAvailable(String),

    /// The store could not be created.
    #[error(transparent)]
    Backend(#[from] BackendError),
}
