//! API constants

/// Versioned route prefix
pub const API_PREFIX: &str = "/api/v0";

/// Upper bound for `limit` on list endpoints
pub const MAX_PAGE_SIZE: i64 = 1000;

/// Page size when the client does not send `limit`
pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// JSON bodies on this API are small; anything larger is rejected before deserialization
pub const MAX_BODY_BYTES: usize = 1024 * 1024;
