//! X-Request-ID validation and generation.

use uuid::Uuid;

/// Header carrying the request id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Longest request id accepted from a client.
pub const MAX_REQUEST_ID_LEN: usize = 32;

/// Accepts ids of at most 32 bytes containing at least one ASCII
/// alphanumeric or dash.
pub fn is_valid(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_REQUEST_ID_LEN
        && id.bytes().any(|b| b.is_ascii_alphanumeric() || b == b'-')
}

/// Generates a fresh id as 32 lowercase hex chars.
pub fn generate() -> String {
    Uuid::new_v4().simple().to_string()
}
