//! Prelude module for convenient imports.
//!
//! ```
//! use courier_core::prelude::*;
//! ```

pub use crate::{
    ApiError, ApiErrorKind, ContentType, Endpoint, Error, Media, Method, Outcome, RequestContext,
    Result, Transport, TypedSchema, Value,
};
