//! Mapping of error responses onto typed API errors.
//!
//! The paired server reports failures through response headers:
//! `error-code` (numeric api code), `error-name`, `error-message`,
//! `error-data` (JSON) and `error-id` (UUID). An [`ErrorRegistry`] maps
//! `(http status, api code)` to an [`ApiErrorKind`]; the six reserved kinds
//! of the paired server are always known, clients add their own on top.

use std::collections::HashMap;
use std::fmt;

use derive_more::{Display, Error};
use serde_json::Value;
use uuid::Uuid;

use crate::response::find_header;
use crate::wire;

/// A kind of API error, keyed by HTTP status and optional api code.
///
/// Kinds are plain values so that callers can declare their own as constants
/// and compare them against [`ApiError::kind`].
///
/// ```
/// use courier_core::ApiErrorKind;
///
/// const BROKEN_WAND: ApiErrorKind = ApiErrorKind::new("BrokenWandError", 404, 2001);
/// assert_eq!(BROKEN_WAND.api_code(), Some(2001));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ApiErrorKind {
    name: &'static str,
    http_status: u16,
    api_code: Option<u32>,
}

impl ApiErrorKind {
    /// Generic server-side API error.
    pub const API_ERROR: Self = Self::new("APIError", 501, 1000);
    /// The endpoint does not support the requested method.
    pub const INVALID_METHOD: Self = Self::new("InvalidMethodError", 405, 1001);
    /// The server has nothing to return (also used to signal the end of paging).
    pub const NOTHING_TO_RETURN: Self = Self::new("NothingToReturnError", 400, 1002);
    /// The server rejected the request payload.
    pub const REQUEST_VALIDATION: Self = Self::new("RequestValidationError", 400, 1003);
    /// A rate or size limit was exceeded.
    pub const API_LIMIT: Self = Self::new("APILimitError", 400, 1004);
    /// The server failed to validate its own response.
    pub const RESPONSE_VALIDATION: Self = Self::new("ResponseValidationError", 400, 1005);

    /// Create a kind matched by status and api code.
    #[must_use]
    pub const fn new(name: &'static str, http_status: u16, api_code: u32) -> Self {
        Self {
            name,
            http_status,
            api_code: Some(api_code),
        }
    }

    /// Create a kind matched by status alone, for responses without an
    /// `error-code` header.
    #[must_use]
    pub const fn status_only(name: &'static str, http_status: u16) -> Self {
        Self {
            name,
            http_status,
            api_code: None,
        }
    }

    /// Name of the kind.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// HTTP status the kind is registered for.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.http_status
    }

    /// Api code the kind is registered for.
    #[must_use]
    pub const fn api_code(&self) -> Option<u32> {
        self.api_code
    }

    const fn key(&self) -> (u16, Option<u32>) {
        (self.http_status, self.api_code)
    }
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

static DEFAULT_KINDS: [ApiErrorKind; 6] = [
    ApiErrorKind::API_ERROR,
    ApiErrorKind::INVALID_METHOD,
    ApiErrorKind::NOTHING_TO_RETURN,
    ApiErrorKind::REQUEST_VALIDATION,
    ApiErrorKind::API_LIMIT,
    ApiErrorKind::RESPONSE_VALIDATION,
];

/// Error returned by the server and resolved through an [`ErrorRegistry`].
#[derive(Debug, Clone, PartialEq, Display, Error)]
#[display("{kind} (status {status}): {message}")]
pub struct ApiError {
    kind: ApiErrorKind,
    status: u16,
    message: String,
    data: Option<Value>,
    id: Option<Uuid>,
}

impl ApiError {
    /// Create an API error without payload.
    #[must_use]
    pub fn new(kind: ApiErrorKind, status: u16, message: impl Into<String>) -> Self {
        Self {
            kind,
            status,
            message: message.into(),
            data: None,
            id: None,
        }
    }

    /// Attach the `error-data` payload.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Attach the `error-id`.
    #[must_use]
    pub const fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    /// Resolved kind.
    #[must_use]
    pub const fn kind(&self) -> &ApiErrorKind {
        &self.kind
    }

    /// Observed HTTP status.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Server-supplied message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Server-supplied detail payload.
    #[must_use]
    pub const fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Server-supplied error id.
    #[must_use]
    pub const fn id(&self) -> Option<Uuid> {
        self.id
    }

    /// Returns `true` if the error has the given kind.
    #[must_use]
    pub fn is(&self, kind: &ApiErrorKind) -> bool {
        &self.kind == kind
    }
}

/// Registry of known API error kinds.
///
/// The reserved kinds are shared by every registry and cannot be removed;
/// [`ErrorRegistry::register`] only adds to this registry's local layer.
/// Registries are filled while a client is built and read-only afterwards.
///
/// The two resolution paths match differently. An error status goes through
/// [`ErrorRegistry::resolve`] and needs the exact `(status, code)` a kind was
/// registered for; anything else stays a status mismatch. An acceptable
/// status with an `error-code` header goes through
/// [`ErrorRegistry::resolve_in_band`], which matches by code alone. With
/// `BrokenWandError` registered as `(404, 2001)`, a 200 with code 2001
/// resolves to it but a 500 with code 2001 does not.
#[derive(Debug, Clone, Default)]
pub struct ErrorRegistry {
    local: HashMap<(u16, Option<u32>), ApiErrorKind>,
}

impl ErrorRegistry {
    /// Create a registry that knows the reserved kinds only.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserved kinds shared by all registries.
    #[must_use]
    pub fn defaults() -> &'static [ApiErrorKind] {
        &DEFAULT_KINDS
    }

    /// Add a kind. A local kind registered under the key of a reserved one
    /// shadows it for this registry only.
    ///
    /// Returns the local kind previously registered under the same key.
    pub fn register(&mut self, kind: ApiErrorKind) -> Option<ApiErrorKind> {
        self.local.insert(kind.key(), kind)
    }

    /// Look up the kind registered for `(status, code)`.
    #[must_use]
    pub fn lookup(&self, status: u16, code: Option<u32>) -> Option<&ApiErrorKind> {
        self.local
            .get(&(status, code))
            .or_else(|| DEFAULT_KINDS.iter().find(|kind| kind.key() == (status, code)))
    }

    /// Look up a kind by api code alone, whatever its status.
    #[must_use]
    pub fn lookup_code(&self, code: u32) -> Option<&ApiErrorKind> {
        let mut local: Vec<&ApiErrorKind> = self
            .local
            .values()
            .filter(|kind| kind.api_code == Some(code))
            .collect();
        local.sort_by_key(|kind| kind.http_status);
        local
            .into_iter()
            .next()
            .or_else(|| DEFAULT_KINDS.iter().find(|kind| kind.api_code == Some(code)))
    }

    /// Resolve the error carried by a response, if it matches a known kind
    /// exactly on `(status, code)`.
    #[must_use]
    pub fn resolve(&self, status: u16, headers: &HashMap<String, String>) -> Option<ApiError> {
        let code = match find_header(headers, wire::ERROR_CODE) {
            Some(raw) => Some(raw.trim().parse::<u32>().ok()?),
            None => None,
        };
        let kind = *self.lookup(status, code)?;
        Some(Self::build(kind, status, headers))
    }

    /// Resolve an error reported in-band: a response whose status is
    /// acceptable but which still carries an `error-code` header. The kind is
    /// matched by api code alone.
    #[must_use]
    pub fn resolve_in_band(&self, status: u16, headers: &HashMap<String, String>) -> Option<ApiError> {
        let code = find_header(headers, wire::ERROR_CODE)?.trim().parse::<u32>().ok()?;
        let kind = *self.lookup_code(code)?;
        Some(Self::build(kind, status, headers))
    }

    fn build(kind: ApiErrorKind, status: u16, headers: &HashMap<String, String>) -> ApiError {
        let message = find_header(headers, wire::ERROR_MESSAGE)
            .or_else(|| find_header(headers, wire::ERROR_NAME))
            .unwrap_or(kind.name)
            .to_string();
        let data = find_header(headers, wire::ERROR_DATA).map(|raw| {
            serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
        });
        let id = find_header(headers, wire::ERROR_ID).and_then(|raw| Uuid::parse_str(raw.trim()).ok());

        ApiError {
            kind,
            status,
            message,
            data,
            id,
        }
    }
}
