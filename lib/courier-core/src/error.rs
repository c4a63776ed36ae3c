//! Error types for courier.

use bytes::Bytes;
use derive_more::{Display, Error, From};

use crate::{ApiError, SchemaError};

// ============================================================================
// Error Type
// ============================================================================

/// Main error type for courier operations.
///
/// Every failure of a call surfaces through this enum. Transport failures
/// (`Connection`, `Tls`, `Timeout`) are reported as the transport produced
/// them; the pipeline never retries.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// Caller-code defect: missing path parameter, bad template, mismatched
    /// merge structure. Never retryable.
    #[display("configuration error: {_0}")]
    #[from(skip)]
    Configuration(#[error(not(source))] String),

    /// No codec is registered for a declared content type.
    #[display("no codec registered for content type '{_0}'")]
    #[from(skip)]
    ContentTypeUnknown(#[error(not(source))] String),

    /// A codec failed to encode an outbound body.
    #[display("cannot encode body as '{content_type}': {message}")]
    #[from(skip)]
    ContentEncode {
        /// Content type that was requested.
        content_type: String,
        /// Codec error message.
        message: String,
    },

    /// A response body could not be decoded.
    #[display("cannot decode response body: {message}")]
    #[from(skip)]
    ContentDecode {
        /// Declared content type, `None` when the decoder was sniffed.
        content_type: Option<String>,
        /// Codec error message.
        message: String,
    },

    /// Response status outside the acceptable set and not a known API error.
    #[display("unexpected status {status}, expected one of {expected:?}")]
    #[from(skip)]
    StatusMismatch {
        /// Observed HTTP status code.
        status: u16,
        /// Statuses accepted by the endpoint.
        expected: Vec<u16>,
        /// Raw response body.
        #[error(not(source))]
        body: Bytes,
    },

    /// Error reported by the server through the paired error convention.
    #[display("{_0}")]
    #[from]
    Api(ApiError),

    /// The request schema rejected the outbound media.
    #[display("request validation failed: {_0}")]
    #[from(skip)]
    RequestValidation(SchemaError),

    /// The response schema rejected the decoded body.
    #[display("response validation failed: {_0}")]
    #[from(skip)]
    ResponseValidation(SchemaError),

    /// Network/connection errors.
    #[display("connection error: {_0}")]
    #[from(skip)]
    Connection(#[error(not(source))] String),

    /// TLS/SSL errors.
    #[display("TLS error: {_0}")]
    #[from(skip)]
    Tls(#[error(not(source))] String),

    /// Request timeout.
    #[display("request timeout")]
    #[from(skip)]
    Timeout,

    /// The transport could not build the outbound request.
    #[display("invalid request: {_0}")]
    #[from(skip)]
    InvalidRequest(#[error(not(source))] String),

    /// URL parsing error.
    #[display("invalid URL: {_0}")]
    #[from]
    InvalidUrl(url::ParseError),
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a TLS error.
    #[must_use]
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls(message.into())
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create an encoding error for the given content type.
    #[must_use]
    pub fn content_encode(content_type: impl Into<String>, message: impl ToString) -> Self {
        Self::ContentEncode {
            content_type: content_type.into(),
            message: message.to_string(),
        }
    }

    /// Create a decoding error.
    #[must_use]
    pub fn content_decode(content_type: Option<&str>, message: impl ToString) -> Self {
        Self::ContentDecode {
            content_type: content_type.map(str::to_string),
            message: message.to_string(),
        }
    }

    /// Returns `true` if this is a configuration error.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Returns `true` if this is a timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Returns `true` if this is a connection error.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Returns the HTTP status code carried by the error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::StatusMismatch { status, .. } => Some(*status),
            Self::Api(api) => Some(api.status()),
            _ => None,
        }
    }

    /// Returns the mapped API error, if this is one.
    #[must_use]
    pub const fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(api) => Some(api),
            _ => None,
        }
    }

    /// Returns the raw response body of a status mismatch.
    #[must_use]
    pub const fn body(&self) -> Option<&Bytes> {
        match self {
            Self::StatusMismatch { body, .. } => Some(body),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ApiErrorKind;

    #[test]
    fn error_display() {
        let err = Error::configuration("missing path parameter 'id'");
        assert_eq!(
            err.to_string(),
            "configuration error: missing path parameter 'id'"
        );

        let err = Error::Timeout;
        assert_eq!(err.to_string(), "request timeout");

        let err = Error::StatusMismatch {
            status: 404,
            expected: vec![200, 201],
            body: Bytes::new(),
        };
        assert_eq!(
            err.to_string(),
            "unexpected status 404, expected one of [200, 201]"
        );

        let err = Error::ContentTypeUnknown("text/csv".to_string());
        assert_eq!(
            err.to_string(),
            "no codec registered for content type 'text/csv'"
        );
    }

    #[test]
    fn error_status() {
        let err = Error::StatusMismatch {
            status: 500,
            expected: vec![200],
            body: Bytes::from_static(b"boom"),
        };
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.body(), Some(&Bytes::from_static(b"boom")));

        let api = ApiError::new(ApiErrorKind::INVALID_METHOD, 405, "nope");
        let err = Error::from(api);
        assert_eq!(err.status(), Some(405));
        assert!(err.api_error().is_some());

        assert_eq!(Error::Timeout.status(), None);
        assert!(Error::Timeout.body().is_none());
    }

    #[test]
    fn error_predicates() {
        assert!(Error::Timeout.is_timeout());
        assert!(Error::connection("refused").is_connection());
        assert!(Error::configuration("bad").is_configuration());
        assert!(!Error::Timeout.is_configuration());
    }
}
