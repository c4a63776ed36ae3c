//! Endpoint descriptors.
//!
//! An [`Endpoint`] is the immutable shape of one HTTP operation: method, path
//! template, acceptable statuses, default query and headers, content types,
//! schemas and hooks. It is built once and shared (cheaply cloned) by every
//! call of that operation.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::{Error, Method, Outcome, PathTemplate, Result, Schema};

/// Custom merge of a decoded body into an update target.
pub type MergeFn = Arc<dyn Fn(&mut Value, Value) -> Result<()> + Send + Sync>;

/// Post-processing of a handled response, run before any merge.
///
/// The hook may replace the decoded value; whatever it returns is what the
/// call produces.
pub type ResponseHook = Arc<dyn Fn(Outcome) -> Result<Outcome> + Send + Sync>;

/// Paging cursor defaults of a paged endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    /// Offset of the first page.
    pub offset: u64,
    /// Page size.
    pub limit: u64,
}

struct EndpointInner {
    method: Method,
    path: PathTemplate,
    statuses: Vec<u16>,
    query: BTreeMap<String, String>,
    headers: Vec<(String, String)>,
    send: Option<String>,
    accept: Option<String>,
    request_schema: Option<Arc<dyn Schema>>,
    response_schema: Option<Arc<dyn Schema>>,
    merge: Option<MergeFn>,
    hook: Option<ResponseHook>,
    paging: Option<Paging>,
}

/// Immutable endpoint descriptor.
///
/// ```
/// use courier_core::Endpoint;
///
/// let endpoint = Endpoint::get("/wizard/{wizard_id}").build().expect("valid");
/// assert!(endpoint.accepts(200));
/// assert!(!endpoint.accepts(201));
/// ```
#[derive(Clone)]
pub struct Endpoint {
    inner: Arc<EndpointInner>,
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = &self.inner;
        f.debug_struct("Endpoint")
            .field("method", &inner.method)
            .field("path", &inner.path.as_str())
            .field("statuses", &inner.statuses)
            .field("query", &inner.query)
            .field("headers", &inner.headers)
            .field("send", &inner.send)
            .field("accept", &inner.accept)
            .field("request_schema", &inner.request_schema.is_some())
            .field("response_schema", &inner.response_schema.is_some())
            .field("merge", &inner.merge.is_some())
            .field("hook", &inner.hook.is_some())
            .field("paging", &inner.paging)
            .finish()
    }
}

impl Endpoint {
    /// Start building an endpoint.
    #[must_use]
    pub fn builder(method: Method, path: impl Into<String>) -> EndpointBuilder {
        EndpointBuilder::new(method, path.into())
    }

    /// `GET` endpoint.
    #[must_use]
    pub fn get(path: impl Into<String>) -> EndpointBuilder {
        Self::builder(Method::Get, path)
    }

    /// `POST` endpoint.
    #[must_use]
    pub fn post(path: impl Into<String>) -> EndpointBuilder {
        Self::builder(Method::Post, path)
    }

    /// `PUT` endpoint.
    #[must_use]
    pub fn put(path: impl Into<String>) -> EndpointBuilder {
        Self::builder(Method::Put, path)
    }

    /// `PATCH` endpoint.
    #[must_use]
    pub fn patch(path: impl Into<String>) -> EndpointBuilder {
        Self::builder(Method::Patch, path)
    }

    /// `DELETE` endpoint.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> EndpointBuilder {
        Self::builder(Method::Delete, path)
    }

    /// HTTP method.
    #[must_use]
    pub fn method(&self) -> Method {
        self.inner.method
    }

    /// Path template.
    #[must_use]
    pub fn path(&self) -> &PathTemplate {
        &self.inner.path
    }

    /// Acceptable statuses, sorted and never empty.
    #[must_use]
    pub fn statuses(&self) -> &[u16] {
        &self.inner.statuses
    }

    /// Returns `true` if `status` is acceptable.
    #[must_use]
    pub fn accepts(&self, status: u16) -> bool {
        self.inner.statuses.binary_search(&status).is_ok()
    }

    /// Default query parameters.
    #[must_use]
    pub fn query(&self) -> &BTreeMap<String, String> {
        &self.inner.query
    }

    /// Default headers, in declaration order.
    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.inner.headers
    }

    /// Outbound content type.
    #[must_use]
    pub fn send(&self) -> Option<&str> {
        self.inner.send.as_deref()
    }

    /// Requested inbound content type, sent as `Accept`.
    #[must_use]
    pub fn accept(&self) -> Option<&str> {
        self.inner.accept.as_deref()
    }

    /// Request body schema.
    #[must_use]
    pub fn request_schema(&self) -> Option<&dyn Schema> {
        self.inner.request_schema.as_deref()
    }

    /// Response body schema.
    #[must_use]
    pub fn response_schema(&self) -> Option<&dyn Schema> {
        self.inner.response_schema.as_deref()
    }

    /// Custom merge function, replacing the merge engine.
    #[must_use]
    pub fn merge_fn(&self) -> Option<&MergeFn> {
        self.inner.merge.as_ref()
    }

    /// Response hook.
    #[must_use]
    pub fn hook(&self) -> Option<&ResponseHook> {
        self.inner.hook.as_ref()
    }

    /// Paging defaults, for paged endpoints.
    #[must_use]
    pub fn paging(&self) -> Option<Paging> {
        self.inner.paging
    }
}

/// Builder for [`Endpoint`].
#[must_use]
pub struct EndpointBuilder {
    method: Method,
    path: String,
    statuses: BTreeSet<u16>,
    query: BTreeMap<String, String>,
    headers: Vec<(String, String)>,
    send: Option<String>,
    accept: Option<String>,
    request_schema: Option<Arc<dyn Schema>>,
    response_schema: Option<Arc<dyn Schema>>,
    merge: Option<MergeFn>,
    hook: Option<ResponseHook>,
    paging: Option<Paging>,
}

impl EndpointBuilder {
    fn new(method: Method, path: String) -> Self {
        Self {
            method,
            path,
            statuses: BTreeSet::new(),
            query: BTreeMap::new(),
            headers: Vec::new(),
            send: None,
            accept: None,
            request_schema: None,
            response_schema: None,
            merge: None,
            hook: None,
            paging: None,
        }
    }

    /// Add an acceptable status. Without any, `200` is the only one.
    pub fn status(mut self, status: u16) -> Self {
        self.statuses.insert(status);
        self
    }

    /// Add acceptable statuses.
    pub fn statuses(mut self, statuses: impl IntoIterator<Item = u16>) -> Self {
        self.statuses.extend(statuses);
        self
    }

    /// Add a default query parameter.
    pub fn query(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query.insert(name.into(), value.to_string());
        self
    }

    /// Add a default header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Content type to encode request media with.
    pub fn send(mut self, content_type: impl AsRef<str>) -> Self {
        self.send = Some(content_type.as_ref().to_string());
        self
    }

    /// Content type to request from the server.
    pub fn accept(mut self, content_type: impl AsRef<str>) -> Self {
        self.accept = Some(content_type.as_ref().to_string());
        self
    }

    /// Schema applied to request media before encoding.
    pub fn request_schema(mut self, schema: impl Schema + 'static) -> Self {
        self.request_schema = Some(Arc::new(schema));
        self
    }

    /// Schema applied to decoded response bodies.
    pub fn response_schema(mut self, schema: impl Schema + 'static) -> Self {
        self.response_schema = Some(Arc::new(schema));
        self
    }

    /// Replace the merge engine for this endpoint.
    pub fn merge_with<F>(mut self, merge: F) -> Self
    where
        F: Fn(&mut Value, Value) -> Result<()> + Send + Sync + 'static,
    {
        self.merge = Some(Arc::new(merge));
        self
    }

    /// Post-process handled responses.
    pub fn hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(Outcome) -> Result<Outcome> + Send + Sync + 'static,
    {
        self.hook = Some(Arc::new(hook));
        self
    }

    /// Page through results, `limit` items at a time, from offset 0.
    pub fn paged(self, limit: u64) -> Self {
        self.paged_from(0, limit)
    }

    /// Page through results from `offset`, `limit` items at a time.
    pub fn paged_from(mut self, offset: u64, limit: u64) -> Self {
        self.paging = Some(Paging { offset, limit });
        self
    }

    /// Build the endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for a malformed path template, a
    /// status outside `100..=599`, or a page size of zero.
    pub fn build(self) -> Result<Endpoint> {
        let path = PathTemplate::parse(self.path)?;

        let mut statuses: Vec<u16> = self.statuses.into_iter().collect();
        if statuses.is_empty() {
            statuses.push(200);
        }
        if let Some(status) = statuses.iter().find(|status| !(100..=599).contains(*status)) {
            return Err(Error::configuration(format!(
                "invalid status code {status} for '{path}'"
            )));
        }
        if self.paging.is_some_and(|paging| paging.limit == 0) {
            return Err(Error::configuration(format!(
                "page size of '{path}' must be positive"
            )));
        }

        Ok(Endpoint {
            inner: Arc::new(EndpointInner {
                method: self.method,
                path,
                statuses,
                query: self.query,
                headers: self.headers,
                send: self.send,
                accept: self.accept,
                request_schema: self.request_schema,
                response_schema: self.response_schema,
                merge: self.merge,
                hook: self.hook,
                paging: self.paging,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ContentType, TypedSchema};

    #[test]
    fn statuses_default_to_ok() {
        let endpoint = Endpoint::get("/wizards").build().expect("valid");
        assert_eq!(endpoint.statuses(), [200]);
        assert_eq!(endpoint.method(), Method::Get);
        assert!(endpoint.paging().is_none());
    }

    #[test]
    fn statuses_are_sorted_and_deduplicated() {
        let endpoint = Endpoint::post("/wizards")
            .status(201)
            .statuses([200, 201, 202])
            .build()
            .expect("valid");
        assert_eq!(endpoint.statuses(), [200, 201, 202]);
        assert!(endpoint.accepts(202));
        assert!(!endpoint.accepts(204));
    }

    #[test]
    fn builder_keeps_declarations() {
        let endpoint = Endpoint::put("/wizard/{id}")
            .query("verbose", true)
            .header("X-House", "Ravenclaw")
            .send(ContentType::Yaml)
            .accept(ContentType::Bson)
            .request_schema(TypedSchema::<Value>::new())
            .merge_with(|current, incoming| {
                *current = incoming;
                Ok(())
            })
            .paged_from(10, 5)
            .build()
            .expect("valid");

        assert_eq!(endpoint.path().as_str(), "/wizard/{id}");
        assert_eq!(endpoint.query().get("verbose").map(String::as_str), Some("true"));
        assert_eq!(endpoint.headers(), [("X-House".to_string(), "Ravenclaw".to_string())]);
        assert_eq!(endpoint.send(), Some("application/yaml"));
        assert_eq!(endpoint.accept(), Some("application/bson"));
        assert!(endpoint.request_schema().is_some());
        assert!(endpoint.response_schema().is_none());
        assert!(endpoint.merge_fn().is_some());
        assert_eq!(endpoint.paging(), Some(Paging { offset: 10, limit: 5 }));
    }

    #[test]
    fn build_rejects_invalid_declarations() {
        assert!(Endpoint::get("/wizard/{id").build().is_err());
        assert!(Endpoint::get("/wizards").status(42).build().is_err());
        let err = Endpoint::get("/wizards").paged(0).build().expect_err("zero page");
        assert!(err.is_configuration());
    }
}
