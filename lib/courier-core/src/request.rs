//! Outbound HTTP request as produced by request assembly.
//!
//! Requests are normally built by [`assemble`](crate::assemble) from an
//! [`Endpoint`](crate::Endpoint) and a [`RequestContext`](crate::RequestContext);
//! [`Request::builder`] stays available for transports and tests.
//!
//! # Example
//!
//! ```
//! use courier_core::{Method, Request};
//! use bytes::Bytes;
//!
//! let url = "https://api.example.com/wizards".parse().expect("valid URL");
//! let request = Request::<Bytes>::builder(Method::Get, url)
//!     .header("Accept", "application/json")
//!     .query("paging-limit", "10")
//!     .build();
//! assert_eq!(request.url().query(), Some("paging-limit=10"));
//! ```

use std::collections::HashMap;

use bytes::Bytes;

use crate::Method;
use crate::response::find_header;

/// An HTTP request with method, URL, headers, and optional body.
#[derive(Debug, Clone)]
pub struct Request<B = Bytes> {
    method: Method,
    url: url::Url,
    headers: HashMap<String, String>,
    body: Option<B>,
}

impl<B> Request<B> {
    /// Creates a new [`RequestBuilder`].
    #[must_use]
    pub fn builder(method: Method, url: url::Url) -> RequestBuilder<B> {
        RequestBuilder::new(method, url)
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Request URL.
    #[must_use]
    pub fn url(&self) -> &url::Url {
        &self.url
    }

    /// Request headers.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Single header value by name, ignoring ASCII case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Request body.
    #[must_use]
    pub const fn body(&self) -> Option<&B> {
        self.body.as_ref()
    }

    /// Consume into (method, url, headers, body).
    #[must_use]
    pub fn into_parts(self) -> (Method, url::Url, HashMap<String, String>, Option<B>) {
        (self.method, self.url, self.headers, self.body)
    }
}

/// Builder for constructing [`Request`] instances.
#[derive(Debug, Clone)]
pub struct RequestBuilder<B = Bytes> {
    method: Method,
    url: url::Url,
    headers: HashMap<String, String>,
    body: Option<B>,
}

impl<B> RequestBuilder<B> {
    /// Creates a new builder.
    #[must_use]
    pub fn new(method: Method, url: url::Url) -> Self {
        Self {
            method,
            url,
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Sets a header, replacing any value already set under the same name
    /// regardless of case.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|key, _| !key.eq_ignore_ascii_case(&name));
        self.headers.insert(name, value.into());
        self
    }

    /// Sets multiple headers, later entries overriding earlier ones.
    #[must_use]
    pub fn headers(self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        headers
            .into_iter()
            .fold(self, |builder, (name, value)| builder.header(name, value))
    }

    /// Appends a query parameter to the URL.
    #[must_use]
    pub fn query(mut self, name: &str, value: &str) -> Self {
        self.url.query_pairs_mut().append_pair(name, value);
        self
    }

    /// Appends multiple query parameters to the URL.
    ///
    /// The URL is left untouched when `pairs` is empty, so no dangling `?`
    /// is produced.
    #[must_use]
    pub fn query_pairs(mut self, pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut pairs = pairs.into_iter().peekable();
        if pairs.peek().is_some() {
            let mut query = self.url.query_pairs_mut();
            for (name, value) in pairs {
                query.append_pair(&name, &value);
            }
        }
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: B) -> Self {
        self.body = Some(body);
        self
    }

    /// Builds the [`Request`].
    #[must_use]
    pub fn build(self) -> Request<B> {
        Request {
            method: self.method,
            url: self.url,
            headers: self.headers,
            body: self.body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(raw: &str) -> url::Url {
        url::Url::parse(raw).expect("valid URL")
    }

    #[test]
    fn request_builder_basic() {
        let request = Request::<Bytes>::builder(Method::Get, url("https://api.example.com/wizards"))
            .header("Accept", "application/json")
            .build();

        assert_eq!(request.method(), Method::Get);
        assert_eq!(request.url().as_str(), "https://api.example.com/wizards");
        assert_eq!(request.header("accept"), Some("application/json"));
        assert!(request.body().is_none());
    }

    #[test]
    fn header_override_ignores_case() {
        let request = Request::<Bytes>::builder(Method::Get, url("https://api.example.com"))
            .header("Accept", "application/json")
            .header("accept", "application/yaml")
            .build();

        assert_eq!(request.headers().len(), 1);
        assert_eq!(request.header("ACCEPT"), Some("application/yaml"));
    }

    #[test]
    fn request_builder_with_query() {
        let request = Request::<Bytes>::builder(Method::Get, url("https://api.example.com/wizards"))
            .query("paging-offset", "0")
            .query("paging-limit", "10")
            .build();

        assert_eq!(
            request.url().as_str(),
            "https://api.example.com/wizards?paging-offset=0&paging-limit=10"
        );
    }

    #[test]
    fn empty_query_pairs_leave_url_alone() {
        let request = Request::<Bytes>::builder(Method::Get, url("https://api.example.com/wizards"))
            .query_pairs(Vec::new())
            .build();

        assert_eq!(request.url().as_str(), "https://api.example.com/wizards");
    }

    #[test]
    fn request_builder_with_body() {
        let body = Bytes::from(r#"{"name":"Cedric Diggory"}"#);
        let request = Request::builder(Method::Post, url("https://api.example.com/wizards"))
            .header("Content-Type", "application/json")
            .body(body.clone())
            .build();

        let (method, _, headers, sent) = request.into_parts();
        assert_eq!(method, Method::Post);
        assert_eq!(headers.get("Content-Type").map(String::as_str), Some("application/json"));
        assert_eq!(sent, Some(body));
    }
}
