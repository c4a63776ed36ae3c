//! Declarative HTTP client for Rust.
//!
//! Calls are described once as [`Endpoint`]s (method, path template,
//! acceptable statuses, content types, schemas, paging) and run through a
//! [`Client`] with a per-call [`RequestContext`]. Bodies are encoded and
//! decoded by content type through the client's [`CodecRegistry`], error
//! responses are mapped to typed [`ApiError`]s, and decoded bodies can be
//! merged in place into caller-owned records.
//!
//! # Example
//!
//! ```no_run
//! # async fn run() -> courier::Result<()> {
//! use courier::prelude::*;
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct Wizard {
//!     #[serde(skip_serializing_if = "Option::is_none")]
//!     id: Option<String>,
//!     name: String,
//!     #[serde(skip_serializing_if = "Option::is_none")]
//!     house: Option<String>,
//! }
//!
//! let client = Client::builder()
//!     .base_url("http://localhost:8080/api/")
//!     .transport(HyperTransport::builder().with_logging().build())
//!     .build()?;
//!
//! let create = Endpoint::post("/wizards").status(201).build()?;
//! let mut wizard = Wizard { id: None, name: "Cedric Diggory".to_string(), house: None };
//! let ctx = RequestContext::new().media(Media::serialize(&wizard)?);
//! client.update(&create, ctx, &mut wizard).await?;
//! assert!(wizard.id.is_some());
//! # Ok(())
//! # }
//! ```

mod client;
pub mod middleware;
mod paging;
pub mod prelude;
mod transport;

pub use client::{Client, ClientBuilder};
pub use paging::{PageState, Pages};
pub use transport::{BoxedService, HyperTransport, HyperTransportBuilder, ServiceFuture};

// Re-export tower for middleware composition
pub use tower;

// Re-export core types
pub use courier_core::{
    ApiError, ApiErrorKind, Body, BsonCodec, Codec, CodecError, CodecRegistry, ContentType,
    Endpoint, EndpointBuilder, Error, ErrorRegistry, FnCodec, JsonCodec, Media, MergeFn, Method,
    Outcome, Paging, PathTemplate, Request, RequestBuilder, RequestContext, Response,
    ResponseHook, Result, Schema, SchemaError, TextCodec, Transport, TypedSchema, Value,
    YamlCodec, codec_fn, merge, merge_record, wire,
};
