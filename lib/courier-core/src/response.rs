//! HTTP response as returned by a [`Transport`](crate::Transport).
//!
//! Header lookups are case-insensitive: transports are free to normalise
//! header names (hyper lower-cases them), mocks usually don't.

use std::collections::HashMap;

use bytes::Bytes;

/// Find a header value by name, ignoring ASCII case.
pub(crate) fn find_header<'h>(headers: &'h HashMap<String, String>, name: &str) -> Option<&'h str> {
    headers.get(name).map(String::as_str).or_else(|| {
        headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    })
}

/// HTTP response with status, headers, and body.
#[derive(Debug, Clone)]
pub struct Response<B = Bytes> {
    status: u16,
    headers: HashMap<String, String>,
    body: B,
}

impl<B> Response<B> {
    /// Creates a new response.
    #[must_use]
    pub fn new(status: u16, headers: HashMap<String, String>, body: B) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// HTTP status code.
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

    /// Declared `Content-Type`, if any.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Response body.
    #[must_use]
    pub const fn body(&self) -> &B {
        &self.body
    }

    /// Consume into (status, headers, body).
    #[must_use]
    pub fn into_parts(self) -> (u16, HashMap<String, String>, B) {
        (self.status, self.headers, self.body)
    }

    /// Status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_basic() {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());

        let response = Response::new(200, headers, Bytes::from(r#"{"id":1}"#));

        assert_eq!(response.status(), 200);
        assert_eq!(response.content_type(), Some("application/json"));
        assert!(response.is_success());
    }

    #[test]
    fn header_lookup_ignores_case() {
        let mut headers = HashMap::new();
        headers.insert("Paging-Next".to_string(), "/names?page=2".to_string());
        let response = Response::new(200, headers, Bytes::new());

        assert_eq!(response.header("paging-next"), Some("/names?page=2"));
        assert_eq!(response.header("PAGING-NEXT"), Some("/names?page=2"));
        assert!(response.header("paging-total-items").is_none());
    }

    #[test]
    fn response_into_parts() {
        let response = Response::new(404, HashMap::new(), Bytes::from("gone"));
        assert!(!response.is_success());

        let (status, headers, body) = response.into_parts();
        assert_eq!(status, 404);
        assert!(headers.is_empty());
        assert_eq!(body, Bytes::from("gone"));
    }
}
