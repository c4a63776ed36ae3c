//! Body values handed to the pipeline.

use bytes::Bytes;
use serde_json::Value;

use crate::{Error, Result};

/// Content types with a default codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// JSON content type (`application/json`).
    Json,
    /// YAML content type (`application/yaml`).
    Yaml,
    /// BSON content type (`application/bson`).
    Bson,
    /// Plain text content type (`text/plain`).
    Text,
}

impl ContentType {
    /// All default content types, in default registration order.
    pub const ALL: [Self; 4] = [Self::Json, Self::Yaml, Self::Bson, Self::Text];

    /// Get the MIME type string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Yaml => "application/yaml",
            Self::Bson => "application/bson",
            Self::Text => "text/plain",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl AsRef<str> for ContentType {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// An unserialized request body.
///
/// The variant drives default encoding: structured values go out as JSON,
/// text as `text/plain`, bytes unencoded.
#[derive(Debug, Clone, PartialEq)]
pub enum Media {
    /// Structured value (mapping, sequence or scalar).
    Value(Value),
    /// Text.
    Text(String),
    /// Pre-serialized bytes.
    Bytes(Bytes),
}

impl Media {
    /// Build structured media from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if the value cannot be represented
    /// as a structured value (e.g. a map with non-string keys).
    pub fn serialize<T: serde::Serialize + ?Sized>(value: &T) -> Result<Self> {
        serde_json::to_value(value)
            .map(Self::Value)
            .map_err(|err| Error::invalid_request(err.to_string()))
    }
}

impl From<Value> for Media {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<String> for Media {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Media {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Bytes> for Media {
    fn from(bytes: Bytes) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<Vec<u8>> for Media {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn content_type_as_str() {
        assert_eq!(ContentType::Json.as_str(), "application/json");
        assert_eq!(ContentType::Yaml.as_str(), "application/yaml");
        assert_eq!(ContentType::Bson.as_str(), "application/bson");
        assert_eq!(ContentType::Text.to_string(), "text/plain");
    }

    #[test]
    fn media_from_conversions() {
        assert_eq!(Media::from("hi"), Media::Text("hi".to_string()));
        assert_eq!(
            Media::from(json!({"name": "Luna"})),
            Media::Value(json!({"name": "Luna"}))
        );
        assert_eq!(
            Media::from(vec![1_u8, 2]),
            Media::Bytes(Bytes::from_static(&[1, 2]))
        );
    }

    #[test]
    fn media_serialize_struct() {
        #[derive(serde::Serialize)]
        struct Wizard {
            name: String,
        }

        let media = Media::serialize(&Wizard {
            name: "Cedric Diggory".to_string(),
        })
        .expect("serialize");
        assert_eq!(media, Media::Value(json!({"name": "Cedric Diggory"})));
    }

    #[test]
    fn media_serialize_rejects_non_string_keys() {
        let mut map = std::collections::HashMap::new();
        map.insert((1, 2), "tuple key");

        let err = Media::serialize(&map).expect_err("tuple keys");
        assert!(matches!(err, Error::InvalidRequest(_)));
    }
}
