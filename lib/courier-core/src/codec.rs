//! Content-type codecs and the registry that selects them.
//!
//! A [`CodecRegistry`] maps content-type strings to [`Codec`]s. Encoding picks
//! a codec from the declared content type or from the shape of the body;
//! decoding uses the response `Content-Type` or, when that is missing, sniffs
//! by trying every registered decoder in registration order.
//!
//! # Decoder contract
//!
//! Sniffing only works if decoders are strict: a decoder must fail on input
//! that is not unambiguously its format. [`Codec::sniff`] is the strict entry
//! point; the JSON and YAML codecs reject bare scalars there (`hello` is valid
//! YAML, but it is not a document) while [`Codec::decode`] accepts any value
//! of the declared format. The TEXT decoder accepts anything and must stay
//! last; register custom sniffing-sensitive codecs with
//! [`CodecRegistry::insert_before`] anchored on `text/plain`.

use std::fmt;
use std::sync::Arc;

use bson::{Bson, Document};
use bytes::Bytes;
use serde_json::Value;

use crate::{ContentType, Error, Media, Result};

/// Error produced by a codec.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("{_0}")]
pub struct CodecError(#[error(not(source))] String);

impl CodecError {
    /// Create a codec error from any message.
    #[must_use]
    pub fn new(message: impl ToString) -> Self {
        Self(message.to_string())
    }
}

/// Encoder/decoder pair for one content type.
pub trait Codec: Send + Sync {
    /// Encode a value to bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be represented in this format.
    fn encode(&self, value: &Value) -> std::result::Result<Bytes, CodecError>;

    /// Decode bytes to a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not well-formed in this format.
    fn decode(&self, bytes: &[u8]) -> std::result::Result<Value, CodecError>;

    /// Decode bytes whose content type is unknown.
    ///
    /// Defaults to [`Codec::decode`]. Override it when the format accepts
    /// input that is not unambiguously its own.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a well-formed document of this
    /// format. See the module docs for the strictness contract.
    fn sniff(&self, bytes: &[u8]) -> std::result::Result<Value, CodecError> {
        self.decode(bytes)
    }
}

impl<C: Codec + ?Sized> Codec for Arc<C> {
    fn encode(&self, value: &Value) -> std::result::Result<Bytes, CodecError> {
        (**self).encode(value)
    }

    fn decode(&self, bytes: &[u8]) -> std::result::Result<Value, CodecError> {
        (**self).decode(bytes)
    }

    fn sniff(&self, bytes: &[u8]) -> std::result::Result<Value, CodecError> {
        (**self).sniff(bytes)
    }
}

/// Codec built from a pair of closures. See [`codec_fn`].
pub struct FnCodec<E, D> {
    encode: E,
    decode: D,
}

/// Build a codec from an encode and a decode closure.
///
/// ```
/// use bytes::Bytes;
/// use courier_core::{codec_fn, CodecError, CodecRegistry, Value};
///
/// let csv = codec_fn(
///     |value: &Value| {
///         let row = value.as_array().ok_or_else(|| CodecError::new("expected a row"))?;
///         let cells: Vec<String> = row.iter().map(ToString::to_string).collect();
///         Ok(Bytes::from(cells.join(",")))
///     },
///     |bytes: &[u8]| {
///         let text = std::str::from_utf8(bytes).map_err(CodecError::new)?;
///         if !text.contains(',') {
///             return Err(CodecError::new("not csv"));
///         }
///         Ok(Value::from(text.split(',').map(str::to_string).collect::<Vec<_>>()))
///     },
/// );
///
/// let mut codecs = CodecRegistry::default();
/// codecs.insert_before("text/plain", "text/csv", csv).expect("anchor exists");
/// assert_eq!(
///     codecs.decode_body(b"a,b", None).expect("sniffed"),
///     Value::from(vec!["a", "b"])
/// );
/// ```
pub fn codec_fn<E, D>(encode: E, decode: D) -> FnCodec<E, D>
where
    E: Fn(&Value) -> std::result::Result<Bytes, CodecError> + Send + Sync,
    D: Fn(&[u8]) -> std::result::Result<Value, CodecError> + Send + Sync,
{
    FnCodec { encode, decode }
}

impl<E, D> Codec for FnCodec<E, D>
where
    E: Fn(&Value) -> std::result::Result<Bytes, CodecError> + Send + Sync,
    D: Fn(&[u8]) -> std::result::Result<Value, CodecError> + Send + Sync,
{
    fn encode(&self, value: &Value) -> std::result::Result<Bytes, CodecError> {
        (self.encode)(value)
    }

    fn decode(&self, bytes: &[u8]) -> std::result::Result<Value, CodecError> {
        (self.decode)(bytes)
    }
}

fn require_document(value: Value, format: &str) -> std::result::Result<Value, CodecError> {
    if value.is_object() || value.is_array() {
        Ok(value)
    } else {
        Err(CodecError::new(format!(
            "{format} input is a bare scalar, not a document"
        )))
    }
}

/// `application/json`: any JSON value, but only mappings and sequences when
/// sniffed.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode(&self, value: &Value) -> std::result::Result<Bytes, CodecError> {
        serde_json::to_vec(value)
            .map(Bytes::from)
            .map_err(CodecError::new)
    }

    fn decode(&self, bytes: &[u8]) -> std::result::Result<Value, CodecError> {
        serde_json::from_slice(bytes).map_err(CodecError::new)
    }

    fn sniff(&self, bytes: &[u8]) -> std::result::Result<Value, CodecError> {
        require_document(self.decode(bytes)?, "JSON")
    }
}

/// `application/yaml`: any YAML value, but only mappings and sequences when
/// sniffed.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlCodec;

impl Codec for YamlCodec {
    fn encode(&self, value: &Value) -> std::result::Result<Bytes, CodecError> {
        serde_yaml::to_string(value)
            .map(Bytes::from)
            .map_err(CodecError::new)
    }

    fn decode(&self, bytes: &[u8]) -> std::result::Result<Value, CodecError> {
        serde_yaml::from_slice(bytes).map_err(CodecError::new)
    }

    fn sniff(&self, bytes: &[u8]) -> std::result::Result<Value, CodecError> {
        require_document(self.decode(bytes)?, "YAML")
    }
}

/// `application/bson`.
///
/// A BSON document is always a mapping. Sequences travel as a document keyed
/// `"0"`, `"1"`, ... and are restored to sequences on decode.
#[derive(Debug, Clone, Copy, Default)]
pub struct BsonCodec;

impl BsonCodec {
    fn is_array_document(document: &Document) -> bool {
        !document.is_empty()
            && document
                .keys()
                .enumerate()
                .all(|(index, key)| key.parse::<usize>().is_ok_and(|parsed| parsed == index))
    }
}

impl Codec for BsonCodec {
    fn encode(&self, value: &Value) -> std::result::Result<Bytes, CodecError> {
        let document = match value {
            Value::Object(_) => bson::to_document(value).map_err(CodecError::new)?,
            Value::Array(items) => {
                let mut document = Document::new();
                for (index, item) in items.iter().enumerate() {
                    let item = bson::to_bson(item).map_err(CodecError::new)?;
                    document.insert(index.to_string(), item);
                }
                document
            }
            _ => return Err(CodecError::new("BSON can only encode mappings and sequences")),
        };
        bson::to_vec(&document)
            .map(Bytes::from)
            .map_err(CodecError::new)
    }

    fn decode(&self, bytes: &[u8]) -> std::result::Result<Value, CodecError> {
        let document: Document = bson::from_slice(bytes).map_err(CodecError::new)?;
        if Self::is_array_document(&document) {
            let items = document
                .into_iter()
                .map(|(_, item)| item.into_relaxed_extjson())
                .collect();
            return Ok(Value::Array(items));
        }
        Ok(Bson::Document(document).into_relaxed_extjson())
    }
}

/// `text/plain`: accepts any input, decoding lossily as UTF-8.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextCodec;

impl Codec for TextCodec {
    fn encode(&self, value: &Value) -> std::result::Result<Bytes, CodecError> {
        match value {
            Value::String(text) => Ok(Bytes::from(text.clone())),
            other => Ok(Bytes::from(other.to_string())),
        }
    }

    fn decode(&self, bytes: &[u8]) -> std::result::Result<Value, CodecError> {
        Ok(Value::String(String::from_utf8_lossy(bytes).into_owned()))
    }
}

/// Media type without parameters, lower-cased: `Application/JSON; charset=utf-8`
/// becomes `application/json`.
fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// `application/octet-stream` says nothing about the format, so it is treated
/// as an undeclared content type.
fn is_undeclared(essence: &str) -> bool {
    essence.is_empty() || essence == "application/octet-stream"
}

/// Body bytes together with the content type they were encoded as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    /// Content type to announce, `None` for pass-through bytes.
    pub content_type: Option<String>,
    /// Encoded body.
    pub body: Bytes,
}

/// Ordered registry of codecs keyed by content type.
///
/// Registration order is sniffing priority. A registry is filled while a
/// client is built and shared read-only (behind an `Arc`) by every call
/// afterwards; it is never mutated while requests are in flight.
#[derive(Clone)]
pub struct CodecRegistry {
    entries: Vec<(String, Arc<dyn Codec>)>,
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("content_types", &self.content_types().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl CodecRegistry {
    /// Registry without any codec.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Registry with JSON, YAML, BSON and TEXT, in that order.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register_defaults();
        registry
    }

    /// Register the default codecs, replacing any existing entry for their
    /// content types.
    pub fn register_defaults(&mut self) {
        for content_type in ContentType::ALL {
            let codec: Arc<dyn Codec> = match content_type {
                ContentType::Json => Arc::new(JsonCodec),
                ContentType::Yaml => Arc::new(YamlCodec),
                ContentType::Bson => Arc::new(BsonCodec),
                ContentType::Text => Arc::new(TextCodec),
            };
            self.register_arc(content_type.as_str(), codec);
        }
    }

    /// Register a codec. An existing entry for the same content type is
    /// replaced in place and keeps its sniffing priority; a new one is
    /// appended.
    pub fn register(&mut self, content_type: impl AsRef<str>, codec: impl Codec + 'static) {
        self.register_arc(content_type.as_ref(), Arc::new(codec));
    }

    fn register_arc(&mut self, content_type: &str, codec: Arc<dyn Codec>) {
        let key = essence(content_type);
        if let Some(slot) = self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            slot.1 = codec;
        } else {
            self.entries.push((key, codec));
        }
    }

    /// Register a codec with sniffing priority just above `anchor`.
    ///
    /// An existing entry for `content_type` is moved. Inserting a content type
    /// before itself replaces its codec in place. The registry is unchanged
    /// on error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ContentTypeUnknown`] if `anchor` is not registered.
    pub fn insert_before(
        &mut self,
        anchor: impl AsRef<str>,
        content_type: impl AsRef<str>,
        codec: impl Codec + 'static,
    ) -> Result<()> {
        let anchor = essence(anchor.as_ref());
        let key = essence(content_type.as_ref());
        let Some(mut position) = self.entries.iter().position(|(existing, _)| *existing == anchor)
        else {
            return Err(Error::ContentTypeUnknown(anchor));
        };
        let codec: Arc<dyn Codec> = Arc::new(codec);
        if key == anchor {
            if let Some(slot) = self.entries.get_mut(position) {
                slot.1 = codec;
            }
            return Ok(());
        }
        if let Some(current) = self.entries.iter().position(|(existing, _)| *existing == key) {
            self.entries.remove(current);
            if current < position {
                position -= 1;
            }
        }
        self.entries.insert(position, (key, codec));
        Ok(())
    }

    /// Codec registered for a content type, parameters ignored.
    #[must_use]
    pub fn get(&self, content_type: &str) -> Option<&dyn Codec> {
        let key = essence(content_type);
        self.entries
            .iter()
            .find(|(existing, _)| *existing == key)
            .map(|(_, codec)| codec.as_ref())
    }

    /// Registered content types in sniffing order.
    pub fn content_types(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(content_type, _)| content_type.as_str())
    }

    /// Encode a request body.
    ///
    /// Bytes are already serialized and always pass through, announced with
    /// the declared content type if there is one. Other bodies use the codec
    /// of the declared content type. Without one, strings (as [`Media::Text`]
    /// or a string [`Media::Value`]) go to TEXT and everything else to JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ContentTypeUnknown`] if no codec matches a declared
    /// content type, or [`Error::ContentEncode`] if the codec fails.
    pub fn encode_for(&self, media: Media, declared: Option<&str>) -> Result<Encoded> {
        let declared = declared.filter(|content_type| !content_type.trim().is_empty());
        match (media, declared) {
            (Media::Bytes(body), declared) => Ok(Encoded {
                content_type: declared.map(str::to_string),
                body,
            }),
            (Media::Value(Value::String(text)), None) => {
                self.encode_value(&Value::String(text), ContentType::Text.as_str())
            }
            (Media::Value(value), declared) => {
                self.encode_value(&value, declared.unwrap_or(ContentType::Json.as_str()))
            }
            (Media::Text(text), declared) => self.encode_value(
                &Value::String(text),
                declared.unwrap_or(ContentType::Text.as_str()),
            ),
        }
    }

    fn encode_value(&self, value: &Value, content_type: &str) -> Result<Encoded> {
        let codec = self
            .get(content_type)
            .ok_or_else(|| Error::ContentTypeUnknown(content_type.to_string()))?;
        let body = codec
            .encode(value)
            .map_err(|err| Error::content_encode(content_type, err))?;
        tracing::debug!(content_type, bytes = body.len(), "encoded request body");
        Ok(Encoded {
            content_type: Some(content_type.to_string()),
            body,
        })
    }

    /// Decode a response body.
    ///
    /// A declared, registered content type selects its codec. A missing (or
    /// `application/octet-stream`) content type falls back to sniffing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ContentTypeUnknown`] if a content type is declared but
    /// not registered, and [`Error::ContentDecode`] if decoding fails or no
    /// sniffed decoder accepts the bytes.
    pub fn decode_body(&self, bytes: &[u8], declared: Option<&str>) -> Result<Value> {
        let key = declared.map(essence).unwrap_or_default();
        if is_undeclared(&key) {
            return self.sniff(bytes);
        }

        let codec = self
            .get(&key)
            .ok_or_else(|| Error::ContentTypeUnknown(key.clone()))?;
        codec
            .decode(bytes)
            .map_err(|err| Error::content_decode(Some(&key), err))
    }

    fn sniff(&self, bytes: &[u8]) -> Result<Value> {
        for (content_type, codec) in &self.entries {
            match codec.sniff(bytes) {
                Ok(value) => {
                    tracing::debug!(content_type = content_type.as_str(), "sniffed response body");
                    return Ok(value);
                }
                Err(err) => {
                    tracing::trace!(content_type = content_type.as_str(), %err, "decoder rejected body");
                }
            }
        }
        Err(Error::content_decode(
            None,
            "no registered decoder accepts the response body",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use serde_json::json;

    fn bson_bytes(value: &Value) -> Bytes {
        BsonCodec.encode(value).expect("bson encode")
    }

    #[test]
    fn defaults_are_ordered() {
        let registry = CodecRegistry::default();
        let types: Vec<_> = registry.content_types().collect();
        check!(types == ["application/json", "application/yaml", "application/bson", "text/plain"]);
    }

    #[test]
    fn encode_structured_defaults_to_json() {
        let registry = CodecRegistry::default();
        let encoded = registry
            .encode_for(Media::Value(json!({"name": "Cedric Diggory"})), None)
            .expect("encode");

        check!(encoded.content_type.as_deref() == Some("application/json"));
        check!(encoded.body.as_ref() == br#"{"name":"Cedric Diggory"}"#);
    }

    #[test]
    fn encode_string_value_defaults_to_text() {
        let registry = CodecRegistry::default();
        let encoded = registry
            .encode_for(Media::Value(json!("Harry Potter")), None)
            .expect("encode");

        check!(encoded.content_type.as_deref() == Some("text/plain"));
        check!(encoded.body.as_ref() == b"Harry Potter");

        let encoded = registry
            .encode_for(Media::Value(json!("Harry Potter")), Some("application/json"))
            .expect("encode");
        check!(encoded.content_type.as_deref() == Some("application/json"));
        check!(encoded.body.as_ref() == br#""Harry Potter""#);
    }

    #[test]
    fn encode_text_defaults_to_text() {
        let encoded = CodecRegistry::default()
            .encode_for(Media::Text("hello".to_string()), None)
            .expect("encode");

        check!(encoded.content_type.as_deref() == Some("text/plain"));
        check!(encoded.body.as_ref() == b"hello");
    }

    #[test]
    fn encode_bytes_pass_through() {
        let registry = CodecRegistry::default();
        let raw = Bytes::from_static(b"\x00\x01raw");

        let encoded = registry.encode_for(Media::Bytes(raw.clone()), None).expect("encode");
        check!(encoded.content_type.is_none());
        check!(encoded.body == raw);

        let encoded = registry
            .encode_for(Media::Bytes(raw.clone()), Some("application/x-custom"))
            .expect("encode");
        check!(encoded.content_type.as_deref() == Some("application/x-custom"));
        check!(encoded.body == raw);
    }

    #[test]
    fn encode_declared_type_wins() {
        let encoded = CodecRegistry::default()
            .encode_for(Media::Value(json!({"first": "Harry"})), Some("application/yaml"))
            .expect("encode");

        check!(encoded.content_type.as_deref() == Some("application/yaml"));
        check!(encoded.body.as_ref() == b"first: Harry\n");
    }

    #[test]
    fn encode_unknown_declared_type_fails() {
        let result = CodecRegistry::default()
            .encode_for(Media::Value(json!({"a": 1})), Some("text/csv"));
        let_assert!(Err(Error::ContentTypeUnknown(content_type)) = result);
        check!(content_type == "text/csv");
    }

    #[test]
    fn encode_failure_is_reported() {
        let result = CodecRegistry::default()
            .encode_for(Media::Value(json!(42)), Some("application/bson"));
        let_assert!(Err(Error::ContentEncode { content_type, .. }) = result);
        check!(content_type == "application/bson");
    }

    #[test]
    fn decode_declared_ignores_parameters() {
        let value = CodecRegistry::default()
            .decode_body(br#"{"house":"Ravenclaw"}"#, Some("Application/JSON; charset=utf-8"))
            .expect("decode");
        check!(value == json!({"house": "Ravenclaw"}));
    }

    #[test]
    fn decode_declared_failure_is_content_decode() {
        let result = CodecRegistry::default().decode_body(b"not json", Some("application/json"));
        let_assert!(Err(Error::ContentDecode { content_type, .. }) = result);
        check!(content_type.as_deref() == Some("application/json"));
    }

    #[test]
    fn decode_declared_unregistered_fails() {
        let result = CodecRegistry::default().decode_body(b"some content", Some("application/unknown"));
        let_assert!(Err(Error::ContentTypeUnknown(_)) = result);
    }

    #[test]
    fn sniff_picks_first_accepting_decoder() {
        let registry = CodecRegistry::default();

        check!(registry.decode_body(br#"[1, 2]"#, None).expect("json") == json!([1, 2]));
        check!(
            registry.decode_body(b"first: Ron\nlast: Weasley\n", None).expect("yaml")
                == json!({"first": "Ron", "last": "Weasley"})
        );

        let bson = bson_bytes(&json!({"first": "Harry", "last": "Potter"}));
        check!(
            registry.decode_body(&bson, Some("application/octet-stream")).expect("bson")
                == json!({"first": "Harry", "last": "Potter"})
        );

        check!(registry.decode_body(b"hello", None).expect("text") == json!("hello"));
    }

    #[test]
    fn sniff_without_any_decoder_fails() {
        let result = CodecRegistry::empty().decode_body(b"{}", None);
        let_assert!(Err(Error::ContentDecode { content_type: None, .. }) = result);
    }

    #[test]
    fn bson_sequences_use_index_keys() {
        let names = json!([
            {"first": "Harry", "last": "Potter"},
            {"first": "Draco", "last": "Malfoy"},
        ]);
        let bytes = bson_bytes(&names);

        let document: Document = bson::from_slice(&bytes).expect("document");
        check!(document.keys().cloned().collect::<Vec<_>>() == ["0", "1"]);
        check!(BsonCodec.decode(&bytes).expect("decode") == names);
    }

    #[test]
    fn strict_sniffers_reject_scalars() {
        check!(JsonCodec.sniff(b"\"just a string\"").is_err());
        check!(YamlCodec.sniff(b"just a string").is_err());
        check!(BsonCodec.sniff(b"just a string").is_err());
    }

    #[test]
    fn declared_scalars_decode() {
        let registry = CodecRegistry::default();

        check!(registry.decode_body(b"42", Some("application/json")).expect("json") == json!(42));
        check!(registry.decode_body(b"true", Some("application/json")).expect("json") == json!(true));
        check!(
            registry.decode_body(b"Hermione", Some("application/yaml")).expect("yaml")
                == json!("Hermione")
        );
        check!(registry.decode_body(b"42", None).expect("sniffed") == json!("42"));
    }

    #[test]
    fn register_replaces_in_place() {
        let mut registry = CodecRegistry::default();
        registry.register(
            "application/json",
            codec_fn(
                |_: &Value| Ok(Bytes::from_static(b"{}")),
                |_: &[u8]| Ok(json!({"replaced": true})),
            ),
        );

        let types: Vec<_> = registry.content_types().collect();
        check!(types.len() == 4);
        check!(types[0] == "application/json");
        check!(registry.decode_body(b"[]", None).expect("decode") == json!({"replaced": true}));
    }

    #[test]
    fn insert_before_sets_priority() {
        let mut registry = CodecRegistry::default();
        let csv = codec_fn(
            |_: &Value| Err(CodecError::new("read only")),
            |bytes: &[u8]| {
                let text = std::str::from_utf8(bytes).map_err(CodecError::new)?;
                if text.contains(',') {
                    Ok(Value::from(text.split(',').map(str::to_string).collect::<Vec<_>>()))
                } else {
                    Err(CodecError::new("not csv"))
                }
            },
        );
        registry.insert_before("text/plain", "text/csv", csv).expect("anchor");

        let types: Vec<_> = registry.content_types().collect();
        check!(types[3] == "text/csv");
        check!(types[4] == "text/plain");
        check!(registry.decode_body(b"Harry,Potter", None).expect("csv") == json!(["Harry", "Potter"]));
        check!(registry.decode_body(b"Harry Potter", None).expect("text") == json!("Harry Potter"));

        let missing = registry.insert_before("text/html", "text/csv", JsonCodec);
        let_assert!(Err(Error::ContentTypeUnknown(_)) = missing);
        check!(registry.content_types().count() == 5);
    }

    #[test]
    fn insert_before_moves_an_existing_entry() {
        let mut registry = CodecRegistry::default();
        registry.insert_before("application/json", "text/plain", TextCodec).expect("anchor");

        let types: Vec<_> = registry.content_types().collect();
        check!(types == ["text/plain", "application/json", "application/yaml", "application/bson"]);
    }

    #[test]
    fn insert_before_itself_keeps_the_entry() {
        let mut registry = CodecRegistry::default();
        let spell = codec_fn(
            |_: &Value| Ok(Bytes::from_static(b"spell")),
            |_: &[u8]| Ok(json!("spell")),
        );
        registry.insert_before("text/plain", "text/plain", spell).expect("anchor");

        let types: Vec<_> = registry.content_types().collect();
        check!(types == ["application/json", "application/yaml", "application/bson", "text/plain"]);
        check!(registry.decode_body(b"hello", None).expect("text") == json!("spell"));
    }

    #[test]
    fn insert_before_unknown_anchor_leaves_registry_unchanged() {
        let mut registry = CodecRegistry::default();

        let result = registry.insert_before("text/html", "text/plain", TextCodec);
        let_assert!(Err(Error::ContentTypeUnknown(anchor)) = result);
        check!(anchor == "text/html");

        let types: Vec<_> = registry.content_types().collect();
        check!(types == ["application/json", "application/yaml", "application/bson", "text/plain"]);
    }
}
