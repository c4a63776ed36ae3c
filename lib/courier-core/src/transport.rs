//! The transport seam.
//!
//! The pipeline never talks to the network itself: it hands assembled
//! requests to a [`Transport`] and handles whatever comes back. The `courier`
//! crate ships a hyper-based implementation; tests usually plug in a
//! recording one.

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;

use crate::{Request, Response, Result};

/// Executes HTTP requests.
///
/// Transport failures (connection refused, TLS, timeout) are returned as the
/// corresponding [`Error`](crate::Error) variants and reach the caller
/// unmodified; the pipeline does not retry.
pub trait Transport: Send + Sync {
    /// Send a request and return the response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails for any reason:
    /// - Network errors
    /// - TLS errors
    /// - Timeouts
    fn send(&self, request: Request<Bytes>) -> impl Future<Output = Result<Response<Bytes>>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn send(&self, request: Request<Bytes>) -> impl Future<Output = Result<Response<Bytes>>> + Send {
        (**self).send(request)
    }
}

impl<T: Transport> Transport for &T {
    fn send(&self, request: Request<Bytes>) -> impl Future<Output = Result<Response<Bytes>>> + Send {
        (**self).send(request)
    }
}
