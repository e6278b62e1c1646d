//! `Cache-Control` directive model.
//!
//! A `Cache-Control` header is a comma separated list of directives. Each
//! directive is either a bare flag (`public`, `no-cache`) or carries a value
//! (`max-age=300`). This module keeps that distinction explicit with
//! [`Directive`] and keeps directive order stable with [`CacheControl`].
//!
//! ## Patching
//!
//! [`CacheControl::patch`] merges a set of incoming directives into an
//! existing set following these rules:
//!
//! 1. When both sides carry `max-age`, the smaller value wins.
//! 2. Incoming `public` removes an existing `private`; otherwise incoming
//!    `private` removes an existing `public`.
//! 3. On any other collision the incoming directive replaces the existing one
//!    in place.
//!
//! ```
//! use cachet_core::CacheControl;
//!
//! let mut cc = CacheControl::parse("private, max-age=300");
//! cc.patch(CacheControl::new().flag("public").max_age(100));
//! assert_eq!(cc.to_string(), "max-age=100, public");
//! ```

use std::fmt;

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::vary::header_tokens;

const MAX_AGE: &str = "max-age";
const PUBLIC: &str = "public";
const PRIVATE: &str = "private";

/// A single `Cache-Control` directive value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Directive {
    /// Flag-only directive, serialized as the bare name (`public`).
    Flag,
    /// Directive with a value, serialized as `name=value` (`max-age=300`).
    Value(SmolStr),
}

impl Directive {
    /// Creates a valued directive from anything displayable.
    pub fn value(value: impl fmt::Display) -> Self {
        Directive::Value(SmolStr::new(value.to_string()))
    }

    /// Returns the directive value, or `None` for flags.
    pub fn as_value(&self) -> Option<&str> {
        match self {
            Directive::Flag => None,
            Directive::Value(value) => Some(value),
        }
    }

    /// Returns `true` for flag-only directives.
    pub fn is_flag(&self) -> bool {
        matches!(self, Directive::Flag)
    }

    fn as_seconds(&self) -> Option<u64> {
        self.as_value()?.trim().parse().ok()
    }
}

/// Normalizes a directive name: lowercase, underscores become hyphens.
///
/// ```
/// assert_eq!(cachet_core::normalize_directive_name("Max_Age"), "max-age");
/// ```
pub fn normalize_directive_name(name: &str) -> SmolStr {
    SmolStr::new(name.to_ascii_lowercase().replace('_', "-"))
}

/// An ordered set of `Cache-Control` directives.
///
/// Directive order is insertion order. Replacing an existing directive keeps
/// its position, so patching a header only appends genuinely new directives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheControl {
    directives: IndexMap<SmolStr, Directive>,
}

impl CacheControl {
    /// Creates an empty directive set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a header value.
    ///
    /// Tokens are separated by commas. A token is split on its first `=`;
    /// a token without `=` becomes a [`Directive::Flag`]. Names are
    /// lowercased, values are kept verbatim. Malformed input never fails.
    pub fn parse(header: &str) -> Self {
        let directives = header_tokens(header)
            .map(|token| match token.split_once('=') {
                Some((name, value)) => (
                    SmolStr::new(name.to_ascii_lowercase()),
                    Directive::Value(SmolStr::new(value)),
                ),
                None => (SmolStr::new(token.to_ascii_lowercase()), Directive::Flag),
            })
            .collect();
        Self { directives }
    }

    /// Adds a directive, normalizing its name. Builder style.
    pub fn directive(mut self, name: &str, directive: Directive) -> Self {
        self.insert(name, directive);
        self
    }

    /// Adds a flag-only directive. Builder style.
    pub fn flag(self, name: &str) -> Self {
        self.directive(name, Directive::Flag)
    }

    /// Adds a valued directive. Builder style.
    pub fn with_value(self, name: &str, value: impl fmt::Display) -> Self {
        self.directive(name, Directive::value(value))
    }

    /// Adds `max-age=<seconds>`. Builder style.
    pub fn max_age(self, seconds: u64) -> Self {
        self.with_value(MAX_AGE, seconds)
    }

    /// Inserts a directive under its normalized name, returning the previous value.
    pub fn insert(&mut self, name: &str, directive: Directive) -> Option<Directive> {
        self.directives
            .insert(normalize_directive_name(name), directive)
    }

    /// Looks up a directive by (normalized) name.
    pub fn get(&self, name: &str) -> Option<&Directive> {
        self.directives.get(normalize_directive_name(name).as_str())
    }

    /// Returns `true` if the directive is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Removes a directive, preserving the order of the remaining ones.
    pub fn remove(&mut self, name: &str) -> Option<Directive> {
        self.directives
            .shift_remove(normalize_directive_name(name).as_str())
    }

    /// Iterates directives in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Directive)> {
        self.directives
            .iter()
            .map(|(name, directive)| (name.as_str(), directive))
    }

    /// Number of directives.
    pub fn len(&self) -> usize {
        self.directives.len()
    }

    /// Returns `true` when no directive is present.
    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    /// Returns `max-age` in seconds, or `None` when absent or not an integer.
    pub fn max_age_seconds(&self) -> Option<u64> {
        self.directives.get(MAX_AGE)?.as_seconds()
    }

    /// Merges `incoming` into this set. See the [module docs](self) for the rules.
    pub fn patch(&mut self, mut incoming: CacheControl) {
        if let (Some(existing), Some(requested)) = (
            self.directives.get(MAX_AGE).and_then(Directive::as_seconds),
            incoming.directives.get(MAX_AGE).and_then(Directive::as_seconds),
        ) {
            incoming
                .directives
                .insert(SmolStr::new_static(MAX_AGE), Directive::value(existing.min(requested)));
        }

        if self.directives.contains_key(PRIVATE) && incoming.directives.contains_key(PUBLIC) {
            self.directives.shift_remove(PRIVATE);
        } else if self.directives.contains_key(PUBLIC)
            && incoming.directives.contains_key(PRIVATE)
        {
            self.directives.shift_remove(PUBLIC);
        }

        self.directives.extend(incoming.directives);
    }
}

impl fmt::Display for CacheControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, directive)) in self.directives.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match directive {
                Directive::Flag => write!(f, "{}", name)?,
                Directive::Value(value) => write!(f, "{}={}", name, value)?,
            }
        }
        Ok(())
    }
}

impl From<&str> for CacheControl {
    fn from(header: &str) -> Self {
        CacheControl::parse(header)
    }
}

impl<'a> FromIterator<(&'a str, Directive)> for CacheControl {
    fn from_iter<I: IntoIterator<Item = (&'a str, Directive)>>(iter: I) -> Self {
        let mut cc = CacheControl::new();
        for (name, directive) in iter {
            cc.insert(name, directive);
        }
        cc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keeps_values_verbatim_and_lowercases_names() {
        let cc = CacheControl::parse("S-MaxAge=300, Public,max-age=0");
        let collected: Vec<_> = cc.iter().collect();
        assert_eq!(
            collected,
            vec![
                ("s-maxage", &Directive::Value("300".into())),
                ("public", &Directive::Flag),
                ("max-age", &Directive::Value("0".into())),
            ]
        );
    }

    #[test]
    fn token_without_equals_is_a_flag() {
        let cc = CacheControl::parse("garbage ; stuff");
        assert_eq!(cc.get("garbage ; stuff"), Some(&Directive::Flag));
    }

    #[test]
    fn non_numeric_max_age_is_not_found() {
        assert_eq!(CacheControl::parse("max-age=soon").max_age_seconds(), None);
        assert_eq!(CacheControl::parse("public").max_age_seconds(), None);
        assert_eq!(CacheControl::parse("max-age=42").max_age_seconds(), Some(42));
    }

    #[test]
    fn builder_normalizes_names() {
        let cc = CacheControl::new().flag("No_Cache").with_value("S_MAXAGE", 10);
        assert_eq!(cc.to_string(), "no-cache, s-maxage=10");
    }

    #[test]
    fn patch_replaces_in_place() {
        let mut cc = CacheControl::parse("no-cache, s-maxage=10");
        cc.patch(CacheControl::new().with_value("s-maxage", 20).flag("no-store"));
        assert_eq!(cc.to_string(), "no-cache, s-maxage=20, no-store");
    }

    #[test]
    fn non_numeric_existing_max_age_yields_to_incoming() {
        let mut cc = CacheControl::parse("max-age=later");
        cc.patch(CacheControl::new().max_age(60));
        assert_eq!(cc.max_age_seconds(), Some(60));
    }
}
