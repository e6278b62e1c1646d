//! YAML configuration for cachet.
//!
//! A document holds the negotiator [`Settings`] and a set of named stores.
//! The store named by `cache_middleware_alias` is the one the negotiator
//! uses:
//!
//! ```
//! use cachet_configuration::Config;
//!
//! let config = Config::from_yaml(
//!     r#"
//! settings:
//!   cache_middleware_seconds: 300
//! caches:
//!   default:
//!     type: Moka
//!     max_capacity: 10000
//! "#,
//! )
//! .unwrap();
//! assert_eq!(config.settings.cache_middleware_seconds, 300);
//! assert!(config.backend().is_ok());
//! ```
//!
//! [`Settings`]: cachet::Settings

pub mod backend;
mod config;
mod error;

pub use backend::{Backend, BackendConfig, Moka, Redis, ValueFormat, ValueSerialization};
pub use config::Config;
pub use error::ConfigError;
