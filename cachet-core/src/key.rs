//! Cache key types and construction.
//!
//! Keys are dot separated strings made of a **namespace** followed by
//! **parts**:
//!
//! `{namespace}.{part1}.{part2}...`
//!
//! Two namespaces are used by the negotiator:
//!
//! - `cache_header` keys point at the learned [`HeaderList`] of a path
//! - `cache_page` keys identify one variant of a page
//!
//! Parts are rendered verbatim, so an empty key prefix produces two
//! consecutive dots. Stores rely on the rendered form being stable.
//!
//! ```
//! use cachet_core::{CacheKey, KeyParts};
//!
//! let mut parts = KeyParts::new("cache_header");
//! parts.push("site");
//! parts.push("d41d8cd98f00b204e9800998ecf8427e");
//! let key = parts.into_cache_key();
//! assert_eq!(key.as_str(), "cache_header.site.d41d8cd98f00b204e9800998ecf8427e");
//!
//! let key = CacheKey::new("cache_page", vec!["".into(), "GET".into()]);
//! assert_eq!(key.to_string(), "cache_page..GET");
//! ```
//!
//! ## Performance
//!
//! [`CacheKey`] uses `Arc` internally for cheap cloning - copying a key
//! only increments a reference count rather than cloning all parts.
//!
//! [`HeaderList`]: crate::HeaderList

use smol_str::SmolStr;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

const SEPARATOR: char = '.';

/// Inner structure containing the actual cache key data.
/// Wrapped in Arc for cheap cloning.
#[derive(Debug, Eq, PartialEq)]
struct CacheKeyInner {
    namespace: SmolStr,
    parts: Vec<SmolStr>,
    rendered: String,
}

impl CacheKeyInner {
    fn new(namespace: SmolStr, parts: Vec<SmolStr>) -> Self {
        let capacity = namespace.len() + parts.iter().map(|p| p.len() + 1).sum::<usize>();
        let mut rendered = String::with_capacity(capacity);
        rendered.push_str(&namespace);
        for part in &parts {
            rendered.push(SEPARATOR);
            rendered.push_str(part);
        }
        CacheKeyInner {
            namespace,
            parts,
            rendered,
        }
    }
}

/// A key identifying an entry in an external store.
///
/// # Cheap Cloning
///
/// `CacheKey` wraps its data in [`Arc`], making `clone()` an O(1) operation
/// that only increments a reference count.
#[derive(Clone, Debug)]
pub struct CacheKey {
    inner: Arc<CacheKeyInner>,
}

impl PartialEq for CacheKey {
    fn eq(&self, other: &Self) -> bool {
        // Fast path: same Arc pointer
        Arc::ptr_eq(&self.inner, &other.inner) || self.inner.rendered == other.inner.rendered
    }
}

impl Eq for CacheKey {}

impl Hash for CacheKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.rendered.hash(state);
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner.rendered)
    }
}

impl serde::Serialize for CacheKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.inner.rendered)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl CacheKey {
    /// Creates a new cache key from a namespace and its parts.
    pub fn new(namespace: impl Into<SmolStr>, parts: Vec<SmolStr>) -> Self {
        CacheKey {
            inner: Arc::new(CacheKeyInner::new(namespace.into(), parts)),
        }
    }

    /// Returns the namespace (first segment) of the key.
    pub fn namespace(&self) -> &str {
        &self.inner.namespace
    }

    /// Returns an iterator over the parts following the namespace.
    pub fn parts(&self) -> impl Iterator<Item = &str> {
        self.inner.parts.iter().map(SmolStr::as_str)
    }

    /// Returns the rendered key.
    pub fn as_str(&self) -> &str {
        &self.inner.rendered
    }

    /// Returns the estimated memory usage of this cache key in bytes.
    ///
    /// Used by stores that bound their capacity by weight.
    pub fn memory_size(&self) -> usize {
        use std::mem::size_of;

        // Arc heap allocation: strong count + weak count + data
        let arc_overhead = 2 * size_of::<usize>() + size_of::<CacheKeyInner>();
        let parts = self.inner.parts.len() * size_of::<SmolStr>();

        arc_overhead + parts + self.inner.rendered.capacity()
    }
}

/// Builder for accumulating key parts.
///
/// Key derivation pushes parts in a fixed order (prefix, method, hashes,
/// locale, timezone) and finally calls [`KeyParts::into_cache_key`].
#[derive(Debug, Clone)]
pub struct KeyParts {
    namespace: SmolStr,
    parts: Vec<SmolStr>,
}

impl KeyParts {
    /// Creates an empty builder for the given namespace.
    pub fn new(namespace: impl Into<SmolStr>) -> Self {
        KeyParts {
            namespace: namespace.into(),
            parts: Vec::new(),
        }
    }

    /// Appends a single part.
    pub fn push(&mut self, part: impl Into<SmolStr>) {
        self.parts.push(part.into())
    }

    /// Consumes the builder and returns the finished key.
    pub fn into_cache_key(self) -> CacheKey {
        CacheKey::new(self.namespace, self.parts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_keys_hash_alike() {
        use std::collections::HashSet;

        let a = CacheKey::new("ns", vec!["a".into(), "b".into()]);
        let mut parts = KeyParts::new("ns");
        parts.push("a");
        parts.push("b");
        let b = parts.into_cache_key();

        assert_eq!(a, b);
        let set: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn exposes_namespace_and_parts() {
        let key = CacheKey::new("cache_page", vec!["p".into(), "GET".into()]);
        assert_eq!(key.namespace(), "cache_page");
        assert_eq!(key.parts().collect::<Vec<_>>(), vec!["p", "GET"]);
    }
}
