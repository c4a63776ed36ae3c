//! Prelude module for convenient imports.
//!
//! ```
//! use courier::prelude::*;
//! ```

pub use crate::{
    ApiError, ApiErrorKind, Client, ContentType, Endpoint, Error, HyperTransport, Media, Method,
    Outcome, RequestContext, Result, Transport, TypedSchema, Value,
};
pub use serde::{Deserialize, Serialize};
