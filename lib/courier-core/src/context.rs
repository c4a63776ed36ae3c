//! Per-call request state.

use std::collections::BTreeMap;

use bytes::Bytes;

use crate::Media;

/// Request body of one call: nothing, raw bytes, or unserialized media.
///
/// Being one value, raw content and media can never be set together.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Body {
    /// No body.
    #[default]
    None,
    /// Raw bytes, sent verbatim.
    Content(Bytes),
    /// Unserialized media, run through the request schema and a codec.
    Media(Media),
}

/// Mutable, per-invocation request state.
///
/// ```
/// use courier_core::{Body, RequestContext};
/// use serde_json::json;
///
/// let ctx = RequestContext::new()
///     .path_param("wizard_id", "05b289cc")
///     .content("raw")
///     .media(json!({"name": "Luna"}));
/// assert!(matches!(ctx.body(), Body::Media(_)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    path_params: BTreeMap<String, String>,
    query: BTreeMap<String, String>,
    headers: Vec<(String, String)>,
    body: Body,
    projection: BTreeMap<String, bool>,
    offset: Option<u64>,
    limit: Option<u64>,
    send: Option<String>,
    accept: Option<String>,
}

impl RequestContext {
    /// Empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a path parameter, stringified.
    #[must_use]
    pub fn path_param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.set_path_param(name, value);
        self
    }

    /// Set a query parameter, overriding the endpoint default.
    #[must_use]
    pub fn query(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.set_query(name, value);
        self
    }

    /// Set a header, overriding the endpoint default.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    /// Set raw body bytes, clearing any media.
    #[must_use]
    pub fn content(mut self, content: impl Into<Bytes>) -> Self {
        self.set_content(content);
        self
    }

    /// Set body media, clearing any raw content.
    #[must_use]
    pub fn media(mut self, media: impl Into<Media>) -> Self {
        self.set_media(media);
        self
    }

    /// Include (`true`) or exclude (`false`) a field from the response.
    #[must_use]
    pub fn project(mut self, field: impl Into<String>, include: bool) -> Self {
        self.projection.insert(field.into(), include);
        self
    }

    /// Override the endpoint's first paging offset.
    #[must_use]
    pub const fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Override the endpoint's page size.
    #[must_use]
    pub const fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Override the endpoint's outbound content type.
    #[must_use]
    pub fn send(mut self, content_type: impl AsRef<str>) -> Self {
        self.send = Some(content_type.as_ref().to_string());
        self
    }

    /// Override the endpoint's requested inbound content type.
    #[must_use]
    pub fn accept(mut self, content_type: impl AsRef<str>) -> Self {
        self.accept = Some(content_type.as_ref().to_string());
        self
    }

    /// Set a path parameter in place.
    pub fn set_path_param(&mut self, name: impl Into<String>, value: impl ToString) {
        self.path_params.insert(name.into(), value.to_string());
    }

    /// Set a query parameter in place.
    pub fn set_query(&mut self, name: impl Into<String>, value: impl ToString) {
        self.query.insert(name.into(), value.to_string());
    }

    /// Set a header in place, replacing any value set under the same name
    /// regardless of case.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers.retain(|(key, _)| !key.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
    }

    /// Set raw content in place, clearing any media.
    pub fn set_content(&mut self, content: impl Into<Bytes>) {
        self.body = Body::Content(content.into());
    }

    /// Set media in place, clearing any raw content.
    pub fn set_media(&mut self, media: impl Into<Media>) {
        self.body = Body::Media(media.into());
    }

    /// Remove the body.
    pub fn clear_body(&mut self) {
        self.body = Body::None;
    }

    /// Set the paging cursor in place.
    pub fn set_paging(&mut self, offset: u64, limit: u64) {
        self.offset = Some(offset);
        self.limit = Some(limit);
    }

    /// Path parameters.
    #[must_use]
    pub fn path_params(&self) -> &BTreeMap<String, String> {
        &self.path_params
    }

    /// Per-call query parameters.
    #[must_use]
    pub fn query_params(&self) -> &BTreeMap<String, String> {
        &self.query
    }

    /// Per-call headers, in insertion order.
    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Body.
    #[must_use]
    pub const fn body(&self) -> &Body {
        &self.body
    }

    /// Take the body out, leaving [`Body::None`].
    pub fn take_body(&mut self) -> Body {
        std::mem::take(&mut self.body)
    }

    /// Projection flags.
    #[must_use]
    pub fn projection(&self) -> &BTreeMap<String, bool> {
        &self.projection
    }

    /// Paging offset override.
    #[must_use]
    pub const fn paging_offset(&self) -> Option<u64> {
        self.offset
    }

    /// Paging limit override.
    #[must_use]
    pub const fn paging_limit(&self) -> Option<u64> {
        self.limit
    }

    /// Outbound content type override.
    #[must_use]
    pub fn send_type(&self) -> Option<&str> {
        self.send.as_deref()
    }

    /// Inbound content type override.
    #[must_use]
    pub fn accept_type(&self) -> Option<&str> {
        self.accept.as_deref()
    }
}
