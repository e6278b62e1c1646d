//! `Vary` header lists and request-metadata names.
//!
//! A [`Vary`] value lists the request headers that select between variants
//! of a response. When a key is learned from a response, those names are
//! converted to the request-metadata convention (`Accept-Encoding` becomes
//! `HTTP_ACCEPT_ENCODING`) and stored as a [`HeaderList`].

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

const META_PREFIX: &str = "HTTP_";

/// Splits a comma separated header value into trimmed, non-empty tokens.
pub fn header_tokens(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Converts a header name to its request-metadata name.
///
/// ```
/// assert_eq!(cachet_core::meta_name("Accept-Encoding"), "HTTP_ACCEPT_ENCODING");
/// ```
pub fn meta_name(header: &str) -> SmolStr {
    let mut name = String::with_capacity(META_PREFIX.len() + header.len());
    name.push_str(META_PREFIX);
    name.extend(
        header
            .chars()
            .map(|c| if c == '-' { '_' } else { c.to_ascii_uppercase() }),
    );
    SmolStr::new(name)
}

/// Ordered, case-insensitively deduplicated list of header names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vary {
    headers: Vec<SmolStr>,
}

impl Vary {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a `Vary` header value, keeping the order of the names.
    pub fn parse(header: &str) -> Self {
        Self {
            headers: header_tokens(header).map(SmolStr::new).collect(),
        }
    }

    /// Header names in order.
    pub fn headers(&self) -> &[SmolStr] {
        &self.headers
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, header: &str) -> bool {
        self.headers
            .iter()
            .any(|existing| existing.eq_ignore_ascii_case(header))
    }

    /// Appends names not already present (case-insensitive).
    ///
    /// Existing names and their casing are never touched; new names are
    /// appended in the order given, each at most once.
    pub fn extend<I, S>(&mut self, headers: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen: HashSet<String> = self
            .headers
            .iter()
            .map(|header| header.to_ascii_lowercase())
            .collect();
        for header in headers {
            let header = header.as_ref();
            if seen.insert(header.to_ascii_lowercase()) {
                self.headers.push(SmolStr::new(header));
            }
        }
    }

    /// Returns `true` when no header name is listed.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Converts the names to the request-metadata convention.
    pub fn to_header_list(&self) -> HeaderList {
        HeaderList(self.headers.iter().map(|h| meta_name(h)).collect())
    }
}

impl fmt::Display for Vary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, header) in self.headers.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(header)?;
        }
        Ok(())
    }
}

/// Request-metadata names a cached page varies on.
///
/// This is the value stored in the header registry. Order matters: the
/// header values are hashed in this order when a page key is derived.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeaderList(Vec<SmolStr>);

impl HeaderList {
    /// Creates a list from metadata names as given.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    /// Iterates over the metadata names.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(SmolStr::as_str)
    }

    /// Number of names.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when the page does not vary on any header.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&Vary> for HeaderList {
    fn from(vary: &Vary) -> Self {
        vary.to_header_list()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_skip_blanks() {
        let tokens: Vec<_> = header_tokens(" a ,b,, c ").collect();
        assert_eq!(tokens, vec!["a", "b", "c"]);
    }

    #[test]
    fn extend_dedups_within_input() {
        let mut vary = Vary::parse("Accept");
        vary.extend(["Cookie", "COOKIE", "accept"]);
        assert_eq!(vary.to_string(), "Accept, Cookie");
    }

    #[test]
    fn header_list_serializes_as_plain_array() {
        let list = Vary::parse("Accept-Encoding, Cookie").to_header_list();
        let json = serde_json::to_string(&list).unwrap();
        assert_eq!(json, r#"["HTTP_ACCEPT_ENCODING","HTTP_COOKIE"]"#);
    }
}
