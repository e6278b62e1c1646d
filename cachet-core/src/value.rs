//! Cached value type with expiration metadata.
//!
//! Stores receive a [`CacheValue`] carrying the absolute point in time at
//! which the entry must disappear. Remote stores translate it back to a
//! relative TTL ([`CacheValue::ttl`]); in-memory stores feed it to their
//! expiry policy.
//!
//! ```
//! use cachet_core::CacheValue;
//! use std::time::Duration;
//!
//! let value = CacheValue::with_ttl("headers", Some(Duration::from_secs(600)));
//! assert!(value.ttl().unwrap() <= Duration::from_secs(600));
//! assert_eq!(value.into_inner(), "headers");
//! ```

use chrono::{DateTime, Utc};
use std::mem::size_of;
use std::time::Duration;

use crate::Raw;

/// A cached value with an optional expiration timestamp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheValue<T> {
    /// The cached data.
    pub data: T,
    /// When the entry expires. `None` means it never does.
    pub expire: Option<DateTime<Utc>>,
}

impl<T> CacheValue<T> {
    /// Creates a value expiring at `expire`.
    pub fn new(data: T, expire: Option<DateTime<Utc>>) -> Self {
        CacheValue { data, expire }
    }

    /// Creates a value expiring `ttl` from now.
    ///
    /// A TTL too large to represent as a timestamp is treated as no expiry.
    pub fn with_ttl(data: T, ttl: Option<Duration>) -> Self {
        let expire = ttl.and_then(|ttl| {
            let delta = chrono::Duration::from_std(ttl).ok()?;
            Utc::now().checked_add_signed(delta)
        });
        CacheValue { data, expire }
    }

    /// Returns a reference to the data.
    pub fn data(&self) -> &T {
        &self.data
    }

    /// Consumes the value, returning the data.
    pub fn into_inner(self) -> T {
        self.data
    }

    /// Returns the expiration timestamp.
    pub fn expire(&self) -> Option<DateTime<Utc>> {
        self.expire
    }

    /// Remaining time to live, saturating at zero. `None` if it never expires.
    pub fn ttl(&self) -> Option<Duration> {
        self.expire.map(|expire| {
            (expire - Utc::now())
                .to_std()
                .unwrap_or(Duration::ZERO)
        })
    }

    /// Returns `true` once the expiration timestamp has passed.
    pub fn is_expired(&self) -> bool {
        self.expire.is_some_and(|expire| expire <= Utc::now())
    }
}

impl CacheValue<Raw> {
    /// Estimated memory usage of this value in bytes.
    pub fn memory_size(&self) -> usize {
        size_of::<Self>() + self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn past_expiry_saturates_to_zero() {
        let value = CacheValue::new((), Some(Utc::now() - chrono::Duration::seconds(5)));
        assert_eq!(value.ttl(), Some(Duration::ZERO));
        assert!(value.is_expired());
    }

    #[test]
    fn no_expiry_never_expires() {
        let value = CacheValue::with_ttl((), None);
        assert_eq!(value.ttl(), None);
        assert!(!value.is_expired());
    }
}
