//! Value formats for stored entries.
//!
//! A store keeps bytes; a [`Format`] turns typed values into those bytes and
//! back. The trait is object safe (`&dyn Format`) thanks to `erased-serde`,
//! while [`FormatExt`] adds the generic helpers callers actually use.

use cachet_core::Raw;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

mod json;
mod ron;

pub use json::JsonFormat;
pub use ron::RonFormat;

/// Serialization failure inside a [`Format`].
#[derive(Error, Debug)]
pub enum FormatError {
    /// The value could not be encoded.
    #[error(transparent)]
    Serialize(Box<dyn std::error::Error + Send>),

    /// The stored bytes could not be decoded.
    #[error(transparent)]
    Deserialize(Box<dyn std::error::Error + Send>),
}

/// Unique identifier for format types, used to compare format equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatTypeId {
    /// [`JsonFormat`].
    Json,
    /// [`RonFormat`].
    Ron,
    /// For user-defined formats. The string should be a unique identifier.
    Custom(&'static str),
}

/// Object-safe format trait.
pub trait Format: std::fmt::Debug + Send + Sync {
    /// Provides a serializer to `f` and returns the bytes it produced.
    fn with_serializer(
        &self,
        f: &mut dyn FnMut(&mut dyn erased_serde::Serializer) -> Result<(), FormatError>,
    ) -> Result<Raw, FormatError>;

    /// Provides a deserializer over `data` to `f`.
    fn with_deserializer(
        &self,
        data: &[u8],
        f: &mut dyn FnMut(&mut dyn erased_serde::Deserializer<'_>) -> Result<(), FormatError>,
    ) -> Result<(), FormatError>;

    /// Clone this format into a box.
    fn clone_box(&self) -> Box<dyn Format>;

    /// Identifier used to compare formats.
    fn format_type_id(&self) -> FormatTypeId;
}

impl Clone for Box<dyn Format> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Typed helpers over any [`Format`].
pub trait FormatExt: Format {
    /// Serializes `value` into bytes.
    fn serialize<T>(&self, value: &T) -> Result<Raw, FormatError>
    where
        T: Serialize,
    {
        self.with_serializer(&mut |serializer| {
            let erased = value as &dyn erased_serde::Serialize;
            erased
                .erased_serialize(serializer)
                .map_err(|error| FormatError::Serialize(Box::new(error)))
        })
    }

    /// Deserializes a value from `data`.
    fn deserialize<T>(&self, data: &[u8]) -> Result<T, FormatError>
    where
        T: DeserializeOwned,
    {
        let mut result = None;
        self.with_deserializer(data, &mut |deserializer| {
            let value: T = erased_serde::deserialize(deserializer)
                .map_err(|error| FormatError::Deserialize(Box::new(error)))?;
            result = Some(value);
            Ok(())
        })?;
        result.ok_or_else(|| {
            FormatError::Deserialize(Box::new(std::io::Error::other(
                "deserialization produced no result",
            )))
        })
    }
}

impl<F: Format + ?Sized> FormatExt for F {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_are_distinguishable() {
        let formats: Vec<Box<dyn Format>> = vec![Box::new(JsonFormat), Box::new(RonFormat)];
        let cloned = formats.clone();
        assert_eq!(cloned[0].format_type_id(), FormatTypeId::Json);
        assert_eq!(cloned[1].format_type_id(), FormatTypeId::Ron);
    }

    #[test]
    fn garbage_is_a_deserialize_error() {
        let result: Result<Vec<String>, _> = JsonFormat.deserialize(b"{not json");
        assert!(matches!(result, Err(FormatError::Deserialize(_))));
    }
}
