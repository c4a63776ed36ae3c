//! The client: one base URL, one transport and the codec and error
//! registries shared by every call.

use std::sync::Arc;

use bytes::Bytes;
use courier_core::{
    ApiErrorKind, Codec, CodecRegistry, Endpoint, Error, ErrorRegistry, Outcome, RequestContext,
    Response, ResponseHandler, Result, Transport, UpdateTarget, Value, assemble,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{Instrument, info_span};
use url::Url;

use crate::HyperTransport;
use crate::paging::Pages;

/// Declarative HTTP client.
///
/// Calls are described by [`Endpoint`]s and parameterised by a
/// [`RequestContext`]. Cloning is cheap: clones share the transport and the
/// registries.
///
/// ```no_run
/// # async fn run() -> courier::Result<()> {
/// use courier::prelude::*;
///
/// #[derive(Debug, Deserialize)]
/// struct Wizard {
///     name: String,
/// }
///
/// let client = Client::builder().host("api-host").port(8080).build()?;
/// let endpoint = Endpoint::get("/wizard/{wizard_id}").build()?;
///
/// let wizard: Wizard = client
///     .fetch(&endpoint, RequestContext::new().path_param("wizard_id", "05b289cc"))
///     .await?;
/// println!("{}", wizard.name);
/// # Ok(())
/// # }
/// ```
pub struct Client<T = HyperTransport> {
    transport: Arc<T>,
    base_url: Url,
    codecs: Arc<CodecRegistry>,
    errors: Arc<ErrorRegistry>,
}

impl<T> Clone for Client<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            base_url: self.base_url.clone(),
            codecs: Arc::clone(&self.codecs),
            errors: Arc::clone(&self.errors),
        }
    }
}

impl<T> std::fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url.as_str())
            .field("codecs", &self.codecs)
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}

impl Client<HyperTransport> {
    /// Create a client builder using the hyper transport.
    #[must_use]
    pub fn builder() -> ClientBuilder<HyperTransport> {
        ClientBuilder::default()
    }
}

impl<T: Transport> Client<T> {
    /// Base URL every endpoint path is appended to.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Codec registry of this client.
    #[must_use]
    pub fn codecs(&self) -> &CodecRegistry {
        &self.codecs
    }

    /// Error registry of this client.
    #[must_use]
    pub fn errors(&self) -> &ErrorRegistry {
        &self.errors
    }

    /// Transport of this client.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run one call and return its outcome.
    ///
    /// # Errors
    ///
    /// Returns the first failure of assembly, transport or response
    /// handling. A missing path parameter fails before anything is sent.
    pub async fn execute(&self, endpoint: &Endpoint, ctx: RequestContext) -> Result<Outcome> {
        let span = call_span(endpoint);
        let response = self.exchange(endpoint, &ctx).instrument(span.clone()).await?;
        span.in_scope(|| self.handler().handle(endpoint, response, None))
    }

    /// Run one call and deserialize the decoded body.
    ///
    /// # Errors
    ///
    /// As [`execute`](Self::execute), plus [`Error::ResponseValidation`] if
    /// the body does not fit `R`.
    pub async fn fetch<R: DeserializeOwned>(&self, endpoint: &Endpoint, ctx: RequestContext) -> Result<R> {
        self.execute(endpoint, ctx).await?.json()
    }

    /// Run one call and merge the decoded body into `record` in place.
    ///
    /// The request body comes from `ctx`; `record` is only written. On
    /// failure `record` is left as it was.
    ///
    /// # Errors
    ///
    /// As [`execute`](Self::execute), plus [`Error::Configuration`] if the
    /// body does not have the record's structure.
    pub async fn update<'r, R>(
        &self,
        endpoint: &Endpoint,
        ctx: RequestContext,
        record: &'r mut R,
    ) -> Result<&'r mut R>
    where
        R: Serialize + DeserializeOwned,
    {
        let span = call_span(endpoint);
        let response = self.exchange(endpoint, &ctx).instrument(span.clone()).await?;
        span.in_scope(|| {
            self.handler()
                .handle(endpoint, response, Some(UpdateTarget::Record(&mut *record)))
        })?;
        Ok(record)
    }

    /// Run one call and merge the decoded body into an untyped value.
    ///
    /// # Errors
    ///
    /// As [`update`](Self::update); untyped merges are strict and reject
    /// fields `current` does not have.
    pub async fn update_value<'v>(
        &self,
        endpoint: &Endpoint,
        ctx: RequestContext,
        current: &'v mut Value,
    ) -> Result<&'v mut Value> {
        let span = call_span(endpoint);
        let response = self.exchange(endpoint, &ctx).instrument(span.clone()).await?;
        span.in_scope(|| {
            self.handler()
                .handle(endpoint, response, Some(UpdateTarget::Value(&mut *current)))
        })?;
        Ok(current)
    }

    /// Iterate over the items of a paged endpoint.
    ///
    /// Nothing is sent until the first item is pulled.
    #[must_use]
    pub fn paged<R: DeserializeOwned>(&self, endpoint: &Endpoint, ctx: RequestContext) -> Pages<T, R> {
        Pages::new(self.clone(), endpoint.clone(), ctx)
    }

    async fn exchange(&self, endpoint: &Endpoint, ctx: &RequestContext) -> Result<Response<Bytes>> {
        let request = assemble(&self.base_url, &self.codecs, endpoint, ctx)?;
        self.transport.send(request).await
    }

    fn handler(&self) -> ResponseHandler<'_> {
        ResponseHandler::new(&self.codecs, &self.errors)
    }
}

fn call_span(endpoint: &Endpoint) -> tracing::Span {
    info_span!(
        "courier_call",
        method = %endpoint.method(),
        path = %endpoint.path()
    )
}

/// Builder for [`Client`].
///
/// Either a full base URL or a host (with optional port and scheme) must be
/// set. The transport defaults to `T::default()`.
pub struct ClientBuilder<T = HyperTransport> {
    base_url: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    scheme: String,
    codecs: CodecRegistry,
    errors: ErrorRegistry,
    transport: Option<T>,
}

impl<T> Default for ClientBuilder<T> {
    fn default() -> Self {
        Self {
            base_url: None,
            host: None,
            port: None,
            scheme: "http".to_string(),
            codecs: CodecRegistry::default(),
            errors: ErrorRegistry::new(),
            transport: None,
        }
    }
}

impl<T> std::fmt::Debug for ClientBuilder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("base_url", &self.base_url)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("scheme", &self.scheme)
            .field("has_transport", &self.transport.is_some())
            .finish_non_exhaustive()
    }
}

impl<T> ClientBuilder<T> {
    /// Set the full base URL. Takes precedence over host, port and scheme.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the host name.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the port appended to the host.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the URL scheme used with [`host`](Self::host). Defaults to `http`.
    #[must_use]
    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Register a codec, replacing any codec already registered for the
    /// content type. New content types are sniffed last.
    #[must_use]
    pub fn codec(mut self, content_type: impl AsRef<str>, codec: impl Codec + 'static) -> Self {
        self.codecs.register(content_type, codec);
        self
    }

    /// Register a codec sniffed just before `anchor`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ContentTypeUnknown`] if `anchor` is not registered.
    pub fn codec_before(
        mut self,
        anchor: impl AsRef<str>,
        content_type: impl AsRef<str>,
        codec: impl Codec + 'static,
    ) -> Result<Self> {
        self.codecs.insert_before(anchor, content_type, codec)?;
        Ok(self)
    }

    /// Replace the whole codec registry.
    #[must_use]
    pub fn codecs(mut self, codecs: CodecRegistry) -> Self {
        self.codecs = codecs;
        self
    }

    /// Register an API error kind for this client.
    #[must_use]
    pub fn error_kind(mut self, kind: ApiErrorKind) -> Self {
        self.errors.register(kind);
        self
    }

    /// Use a different transport.
    #[must_use]
    pub fn transport<U>(self, transport: U) -> ClientBuilder<U> {
        ClientBuilder {
            base_url: self.base_url,
            host: self.host,
            port: self.port,
            scheme: self.scheme,
            codecs: self.codecs,
            errors: self.errors,
            transport: Some(transport),
        }
    }

    fn resolve_base_url(&self) -> Result<Url> {
        if let Some(url) = &self.base_url {
            return Ok(Url::parse(url)?);
        }
        let host = self
            .host
            .as_deref()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| Error::configuration("a base URL or a host name is required"))?;
        let authority = match self.port {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        Ok(Url::parse(&format!("{}://{authority}/", self.scheme))?)
    }
}

impl<T: Transport + Default> ClientBuilder<T> {
    /// Build the client, freezing the registries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if neither a base URL nor a host was
    /// set, and [`Error::InvalidUrl`] if the URL does not parse.
    pub fn build(self) -> Result<Client<T>> {
        let base_url = self.resolve_base_url()?;
        tracing::debug!(%base_url, codecs = ?self.codecs.content_types().collect::<Vec<_>>(), "client built");
        Ok(Client {
            transport: Arc::new(self.transport.unwrap_or_default()),
            base_url,
            codecs: Arc::new(self.codecs),
            errors: Arc::new(self.errors),
        })
    }
}
