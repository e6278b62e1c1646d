//! Options recognized by the negotiator.
//!
//! Field names mirror the classic settings (`CACHE_MIDDLEWARE_SECONDS` becomes
//! `cache_middleware_seconds`) and every field has the classic default, so a
//! partial YAML or JSON document is enough:
//!
//! ```
//! use cachet::Settings;
//!
//! let settings = Settings::default();
//! assert_eq!(settings.cache_middleware_seconds, 600);
//! assert_eq!(settings.cache_middleware_alias, "default");
//! assert!(settings.use_i18n);
//! ```

use serde::{Deserialize, Serialize};

/// Negotiator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Default timeout in seconds for cached pages and learned header lists.
    pub cache_middleware_seconds: u64,
    /// Namespace inserted into every key.
    pub cache_middleware_key_prefix: String,
    /// Name of the configured store the negotiator uses.
    pub cache_middleware_alias: String,
    /// Whether response enrichment adds an `ETag`.
    pub use_etags: bool,
    /// Whether keys are suffixed with the active language.
    pub use_i18n: bool,
    /// Whether keys are suffixed with the active language (localized formatting).
    pub use_l10n: bool,
    /// Whether keys are suffixed with the active timezone.
    pub use_tz: bool,
    /// Language used when the request carries none.
    pub language_code: String,
    /// Timezone used when the request carries none.
    pub time_zone: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            cache_middleware_seconds: 600,
            cache_middleware_key_prefix: String::new(),
            cache_middleware_alias: "default".to_owned(),
            use_etags: false,
            use_i18n: true,
            use_l10n: false,
            use_tz: false,
            language_code: "en-us".to_owned(),
            time_zone: "America/Chicago".to_owned(),
        }
    }
}

impl Settings {
    /// Returns `true` when keys carry a language suffix.
    pub fn localized_keys(&self) -> bool {
        self.use_i18n || self.use_l10n
    }
}
