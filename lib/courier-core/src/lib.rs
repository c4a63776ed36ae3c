//! Core pipeline of the courier declarative HTTP client.
//!
//! This crate is transport-agnostic. It provides:
//! - [`Endpoint`] - immutable endpoint descriptors and their builder
//! - [`RequestContext`] - per-call state (path, query, headers, body, projection, paging)
//! - [`assemble`] - endpoint + context → [`Request`]
//! - [`CodecRegistry`] - content-type codecs with sniffing
//! - [`ResponseHandler`] - status check, decoding, schema, hook and merge
//! - [`ErrorRegistry`] - mapping of error responses to [`ApiError`]s
//! - [`merge`] / [`merge_record`] - in-place structural merge
//! - [`Transport`] - the seam to the network
//! - [`Error`] and [`Result`] - error handling

mod assemble;
mod body;
mod codec;
mod context;
mod endpoint;
mod error;
mod error_map;
mod handler;
mod merge;
mod method;
mod path_template;
pub mod prelude;
mod request;
mod response;
mod schema;
mod transport;
pub mod wire;

pub use assemble::assemble;
pub use body::{ContentType, Media};
pub use codec::{
    BsonCodec, Codec, CodecError, CodecRegistry, Encoded, FnCodec, JsonCodec, TextCodec, YamlCodec,
    codec_fn,
};
pub use context::{Body, RequestContext};
pub use endpoint::{Endpoint, EndpointBuilder, MergeFn, Paging, ResponseHook};
pub use error::{Error, Result};
pub use error_map::{ApiError, ApiErrorKind, ErrorRegistry};
pub use handler::{Outcome, RecordTarget, ResponseHandler, UpdateTarget};
pub use merge::{merge, merge_record};
pub use method::Method;
pub use path_template::PathTemplate;
pub use request::{Request, RequestBuilder};
pub use response::Response;
pub use schema::{Schema, SchemaError, TypedSchema, from_value};
pub use transport::Transport;

pub use serde_json::Value;
