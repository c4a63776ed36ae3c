//! Response handling: status check, decoding, schema, hook and merge.

use std::collections::HashMap;

use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::response::find_header;
use crate::{CodecRegistry, Endpoint, Error, ErrorRegistry, MergeFn, Response, Result, merge};

/// Result of one handled response.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    status: u16,
    headers: HashMap<String, String>,
    raw: Bytes,
    value: Option<Value>,
}

impl Outcome {
    /// Create an outcome.
    #[must_use]
    pub fn new(status: u16, headers: HashMap<String, String>, raw: Bytes, value: Option<Value>) -> Self {
        Self {
            status,
            headers,
            raw,
            value,
        }
    }

    /// HTTP status.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Response headers.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Single header value by name, ignoring ASCII case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Raw response body.
    #[must_use]
    pub const fn raw(&self) -> &Bytes {
        &self.raw
    }

    /// Decoded body, `None` for an empty body.
    #[must_use]
    pub const fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Replace the decoded body.
    pub fn set_value(&mut self, value: Option<Value>) {
        self.value = value;
    }

    /// Consume into the decoded body.
    #[must_use]
    pub fn into_value(self) -> Option<Value> {
        self.value
    }

    /// Deserialize the decoded body. An empty body deserializes as `null`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResponseValidation`] if the body does not fit `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        crate::schema::from_value(self.value.clone().unwrap_or(Value::Null))
            .map_err(Error::ResponseValidation)
    }
}

/// A typed value that decoded bodies can be merged into.
///
/// Implemented for every serde type; see [`merge_record`](crate::merge_record).
pub trait RecordTarget {
    /// Merge with the merge engine.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if `incoming` does not fit.
    fn merge_value(&mut self, incoming: Value) -> Result<()>;

    /// Merge with a custom merge function working on the value form.
    ///
    /// # Errors
    ///
    /// Returns the merge function's error, or [`Error::Configuration`] if the
    /// merged value no longer fits the record type.
    fn merge_custom(&mut self, custom: &MergeFn, incoming: Value) -> Result<()>;
}

impl<T: Serialize + DeserializeOwned> RecordTarget for T {
    fn merge_value(&mut self, incoming: Value) -> Result<()> {
        crate::merge_record(self, incoming)
    }

    fn merge_custom(&mut self, custom: &MergeFn, incoming: Value) -> Result<()> {
        let mut snapshot = serde_json::to_value(&*self)
            .map_err(|err| Error::configuration(format!("cannot snapshot merge target: {err}")))?;
        custom(&mut snapshot, incoming)?;
        *self = crate::schema::from_value(snapshot)
            .map_err(|err| Error::configuration(format!("structures must match: {err}")))?;
        Ok(())
    }
}

/// Caller-owned value updated in place with the decoded body.
pub enum UpdateTarget<'a> {
    /// Untyped value, merged with the strict merge engine.
    Value(&'a mut Value),
    /// Typed record.
    Record(&'a mut dyn RecordTarget),
}

impl std::fmt::Debug for UpdateTarget<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Record(_) => f.write_str("Record(..)"),
        }
    }
}

impl UpdateTarget<'_> {
    fn update(self, custom: Option<&MergeFn>, incoming: Value) -> Result<()> {
        match (self, custom) {
            (Self::Value(current), Some(custom)) => custom(current, incoming),
            (Self::Value(current), None) => merge(current, incoming),
            (Self::Record(record), Some(custom)) => record.merge_custom(custom, incoming),
            (Self::Record(record), None) => record.merge_value(incoming),
        }
    }
}

/// Turns transport responses into [`Outcome`]s for an endpoint.
#[derive(Debug, Clone, Copy)]
pub struct ResponseHandler<'a> {
    codecs: &'a CodecRegistry,
    errors: &'a ErrorRegistry,
}

impl<'a> ResponseHandler<'a> {
    /// Create a handler over the given registries.
    #[must_use]
    pub const fn new(codecs: &'a CodecRegistry, errors: &'a ErrorRegistry) -> Self {
        Self { codecs, errors }
    }

    /// Handle one response.
    ///
    /// 1. A status outside the endpoint's acceptable set is mapped through
    ///    the error registry, falling back to [`Error::StatusMismatch`]. An
    ///    acceptable response that still carries an `error-code` header is
    ///    mapped by api code.
    /// 2. A non-empty body is decoded with the response `Content-Type`, or
    ///    sniffed when there is none.
    /// 3. The response schema, if any, validates the decoded value.
    /// 4. The response hook, if any, post-processes the outcome.
    /// 5. The decoded value is merged into `target`, if given, with the
    ///    endpoint's merge function or the merge engine.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's error; `target` is untouched unless
    /// the merge itself succeeded.
    pub fn handle(
        &self,
        endpoint: &Endpoint,
        response: Response<Bytes>,
        target: Option<UpdateTarget<'_>>,
    ) -> Result<Outcome> {
        let content_type = response.content_type().map(str::to_string);
        let (status, headers, raw) = response.into_parts();

        if !endpoint.accepts(status) {
            if let Some(api) = self.errors.resolve(status, &headers) {
                tracing::warn!(status, kind = %api.kind(), "server reported an API error");
                return Err(Error::Api(api));
            }
            tracing::warn!(status, expected = ?endpoint.statuses(), "unexpected response status");
            return Err(Error::StatusMismatch {
                status,
                expected: endpoint.statuses().to_vec(),
                body: raw,
            });
        }
        if let Some(api) = self.errors.resolve_in_band(status, &headers) {
            tracing::warn!(status, kind = %api.kind(), "server reported an in-band API error");
            return Err(Error::Api(api));
        }

        let schema = endpoint.response_schema();
        let value = if raw.is_empty() {
            if schema.is_some() {
                return Err(Error::content_decode(
                    content_type.as_deref(),
                    "response body is empty",
                ));
            }
            None
        } else {
            let decoded = self.codecs.decode_body(&raw, content_type.as_deref())?;
            let validated = match schema {
                Some(schema) => schema
                    .deserialize(decoded)
                    .map_err(Error::ResponseValidation)?,
                None => decoded,
            };
            Some(validated)
        };

        let mut outcome = Outcome::new(status, headers, raw, value);
        if let Some(hook) = endpoint.hook() {
            outcome = hook(outcome)?;
        }

        if let (Some(target), Some(value)) = (target, outcome.value()) {
            target.update(endpoint.merge_fn(), value.clone())?;
            tracing::debug!(status, "merged response into update target");
        }

        Ok(outcome)
    }
}
