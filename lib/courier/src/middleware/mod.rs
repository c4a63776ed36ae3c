//! Tower middleware for the hyper transport.
//!
//! Layers wrap the transport service and see every assembled request and
//! raw response. The last layer added is the outermost one and the first to
//! process requests.
//!
//! - [`LoggingLayer`] - logs each exchange using `tracing`
//!
//! # Example
//!
//! ```
//! use courier::HyperTransport;
//! use courier::middleware::LoggingLayer;
//!
//! let transport = HyperTransport::builder()
//!     .layer(LoggingLayer::debug())
//!     .build();
//! # drop(transport);
//! ```

mod logging;

pub use logging::{LogLevel, Logging, LoggingLayer};

// Re-export tower types for convenience
pub use tower::{Layer, ServiceBuilder};
