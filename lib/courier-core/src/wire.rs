//! Header and query names shared with the paired server.
//!
//! These strings are part of the wire contract and must match byte for byte.

/// Query parameter carrying the offset of a page.
pub const PAGING_OFFSET: &str = "paging-offset";
/// Query parameter carrying the size of a page.
pub const PAGING_LIMIT: &str = "paging-limit";
/// Response header pointing at the next page; absent or empty on the last one.
pub const PAGING_NEXT: &str = "paging-next";
/// Response header with the total number of items of a paged collection.
pub const PAGING_TOTAL_ITEMS: &str = "paging-total-items";

/// Prefix of projection query parameters (`project.<field>=1|0`).
pub const PROJECTION_PREFIX: &str = "project.";

/// Response header with the numeric api error code.
pub const ERROR_CODE: &str = "error-code";
/// Response header with the error kind name.
pub const ERROR_NAME: &str = "error-name";
/// Response header with the human readable error message.
pub const ERROR_MESSAGE: &str = "error-message";
/// Response header with a JSON error payload.
pub const ERROR_DATA: &str = "error-data";
/// Response header with the UUID of the error occurrence.
pub const ERROR_ID: &str = "error-id";
