//! Metadata extraction from the transport request.
//!
//! X-Request-ID is copied as the client sent it; validity only decides
//! whether the headers interceptor replaces it with a generated id.

use std::net::SocketAddr;

use http::header::USER_AGENT;
use http::request::Parts;

use crate::context::request_id::X_REQUEST_ID;
use crate::context::{CallContext, MetadataKey};

pub const PLATFORM: &str = "platform";
pub const VERSION: &str = "version";
pub const X_COUNTRY: &str = "x-country";
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";
pub const X_REAL_IP: &str = "x-real-ip";

pub const MAX_USER_AGENT_LEN: usize = 2048;
pub const MAX_PLATFORM_LEN: usize = 64;
pub const MAX_VERSION_LEN: usize = 64;
pub const MAX_COUNTRY_LEN: usize = 16;

/// Copies client metadata from `parts` into the context.
///
/// Values are truncated to their limits; non-UTF-8 headers read as empty.
pub fn extract_metadata(ctx: CallContext, parts: &Parts, method: &str) -> CallContext {
    let user_agent = header(parts, USER_AGENT.as_str(), MAX_USER_AGENT_LEN);

    ctx.with_metadata(MetadataKey::Ip, client_ip(parts))
        .with_metadata(MetadataKey::UserAgent, user_agent)
        .with_metadata(MetadataKey::Platform, header(parts, PLATFORM, MAX_PLATFORM_LEN))
        .with_metadata(MetadataKey::Version, header(parts, VERSION, MAX_VERSION_LEN))
        .with_metadata(MetadataKey::Country, header(parts, X_COUNTRY, MAX_COUNTRY_LEN))
        .with_metadata(MetadataKey::XRequestId, header(parts, X_REQUEST_ID, usize::MAX))
        .with_metadata(MetadataKey::Method, method)
}

/// Client address: first `X-Forwarded-For` hop, then `X-Real-IP`, then the
/// peer address a server left in the request extensions.
pub fn client_ip(parts: &Parts) -> String {
    let forwarded = header(parts, X_FORWARDED_FOR, usize::MAX);
    if let Some(first) = forwarded.split(',').map(str::trim).find(|ip| !ip.is_empty()) {
        return first.to_string();
    }

    let real_ip = header(parts, X_REAL_IP, usize::MAX);
    if !real_ip.is_empty() {
        return real_ip.trim().to_string();
    }

    parts
        .extensions
        .get::<SocketAddr>()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_default()
}

fn header(parts: &Parts, name: &str, max_chars: usize) -> String {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.chars().take(max_chars).collect())
        .unwrap_or_default()
}
