//! Request and response schemas.
//!
//! A [`Schema`] validates and transforms bodies on their way out
//! (`serialize`) and in (`deserialize`). [`TypedSchema`] is the usual
//! implementation: it round-trips the value through a serde type, so the
//! type's shape is the schema.

use std::fmt;
use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Schema rejection, with the path of the offending field.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error)]
pub struct SchemaError {
    path: String,
    message: String,
}

impl SchemaError {
    /// Create a schema error at `path` (`.` for the root).
    #[must_use]
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Path of the rejected field.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Rejection message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() || self.path == "." {
            write!(f, "{}", self.message)
        } else {
            write!(f, "at '{}': {}", self.path, self.message)
        }
    }
}

/// Validation and transformation of bodies.
pub trait Schema: Send + Sync {
    /// Check (and possibly reshape) an outbound value.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] if the value is rejected.
    fn serialize(&self, value: Value) -> Result<Value, SchemaError>;

    /// Check (and possibly reshape) an inbound value.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] if the value is rejected.
    fn deserialize(&self, value: Value) -> Result<Value, SchemaError>;
}

/// Deserialize a value into `T`, reporting the failing field path.
///
/// # Errors
///
/// Returns a [`SchemaError`] naming the path of the first rejected field.
pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, SchemaError> {
    serde_path_to_error::deserialize(value)
        .map_err(|err| SchemaError::new(err.path().to_string(), err.inner().to_string()))
}

fn to_value<T: Serialize>(typed: &T) -> Result<Value, SchemaError> {
    serde_json::to_value(typed).map_err(|err| SchemaError::new(".", err.to_string()))
}

/// Schema given by a serde type.
///
/// Values are deserialized into `T` and serialized back, so unknown fields
/// are dropped (unless `T` denies them) and missing required fields or wrong
/// types are rejected with their path. A `TypedSchema<Vec<T>>` validates a
/// sequence of records.
///
/// ```
/// use courier_core::{Schema, TypedSchema};
/// use serde::{Deserialize, Serialize};
/// use serde_json::json;
///
/// #[derive(Serialize, Deserialize)]
/// struct Name {
///     first: String,
///     last: String,
/// }
///
/// let schema = TypedSchema::<Name>::new();
/// let err = schema
///     .deserialize(json!({"first": "Ron", "last": 7}))
///     .expect_err("wrong type");
/// assert_eq!(err.path(), "last");
/// ```
pub struct TypedSchema<T> {
    _type: PhantomData<fn() -> T>,
}

impl<T> TypedSchema<T> {
    /// Create the schema.
    #[must_use]
    pub const fn new() -> Self {
        Self { _type: PhantomData }
    }
}

impl<T> Default for TypedSchema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for TypedSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypedSchema")
            .field(&std::any::type_name::<T>())
            .finish()
    }
}

impl<T: Serialize + DeserializeOwned> TypedSchema<T> {
    fn round_trip(value: Value) -> Result<Value, SchemaError> {
        let typed: T = from_value(value)?;
        to_value(&typed)
    }
}

impl<T: Serialize + DeserializeOwned> Schema for TypedSchema<T> {
    fn serialize(&self, value: Value) -> Result<Value, SchemaError> {
        Self::round_trip(value)
    }

    fn deserialize(&self, value: Value) -> Result<Value, SchemaError> {
        Self::round_trip(value)
    }
}
