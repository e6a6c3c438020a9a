//! Typed per-call context.
//!
//! # Data Flow
//! ```text
//! transport request (http::request::Parts)
//!     → headers.rs (metadata extraction, truncation)
//!     → request_id.rs (X-Request-ID validation / generation)
//!     → CallContext (cloned into every interceptor and handler)
//!
//! Tracing interceptors add:
//!     → session id (published for the duration of the call)
//!     → trace group (nested by sub-operation producers)
//! ```
//!
//! # Design Decisions
//! - Explicit value threaded through every call boundary, no task-locals
//! - Metadata keys are an enum, so two collaborators cannot collide
//! - Builder-style `with_*` methods consume and return the context

pub mod headers;
pub mod request_id;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use http::request::Parts;

use crate::capture::event::{SessionId, TraceGroup};

/// Recognized metadata keys. Values are plain strings used for tagging only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataKey {
    Ip,
    UserAgent,
    Platform,
    Version,
    Country,
    Method,
    XRequestId,
}

impl MetadataKey {
    pub const ALL: [MetadataKey; 7] = [
        MetadataKey::Ip,
        MetadataKey::UserAgent,
        MetadataKey::Platform,
        MetadataKey::Version,
        MetadataKey::Country,
        MetadataKey::Method,
        MetadataKey::XRequestId,
    ];

    /// Field name used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            MetadataKey::Ip => "ip",
            MetadataKey::UserAgent => "userAgent",
            MetadataKey::Platform => "platform",
            MetadataKey::Version => "version",
            MetadataKey::Country => "country",
            MetadataKey::Method => "method",
            MetadataKey::XRequestId => "xRequestId",
        }
    }
}

impl fmt::Display for MetadataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Context carried alongside a single RPC call.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    is_devel: bool,
    notification: bool,
    session_id: SessionId,
    trace_group: TraceGroup,
    metadata: HashMap<MetadataKey, String>,
    transport: Option<Arc<Parts>>,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches the inbound transport request.
    pub fn with_transport(mut self, parts: Parts) -> Self {
        self.transport = Some(Arc::new(parts));
        self
    }

    pub fn transport(&self) -> Option<&Parts> {
        self.transport.as_deref()
    }

    /// Shared handle to the transport request, detached from the context borrow.
    pub fn transport_handle(&self) -> Option<Arc<Parts>> {
        self.transport.clone()
    }

    pub fn with_devel(mut self, is_devel: bool) -> Self {
        self.is_devel = is_devel;
        self
    }

    pub fn is_devel(&self) -> bool {
        self.is_devel
    }

    /// Marks the call as a JSON-RPC notification (no response expected).
    pub fn with_notification(mut self) -> Self {
        self.notification = true;
        self
    }

    pub fn is_notification(&self) -> bool {
        self.notification
    }

    /// Publishes the tracing session for this call.
    pub fn with_session(mut self, id: SessionId) -> Self {
        self.session_id = id;
        self
    }

    /// The active session id, or [`SessionId::NONE`].
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Nests a sub-operation group under the current one.
    pub fn with_trace_group(mut self, name: &str) -> Self {
        self.trace_group = self.trace_group.nest(name);
        self
    }

    pub fn trace_group(&self) -> &TraceGroup {
        &self.trace_group
    }

    pub fn with_metadata(mut self, key: MetadataKey, value: impl Into<String>) -> Self {
        self.metadata.insert(key, value.into());
        self
    }

    /// Metadata value, or `""` when unset.
    pub fn metadata(&self, key: MetadataKey) -> &str {
        self.metadata.get(&key).map(String::as_str).unwrap_or_default()
    }

    pub fn ip(&self) -> &str {
        self.metadata(MetadataKey::Ip)
    }

    pub fn user_agent(&self) -> &str {
        self.metadata(MetadataKey::UserAgent)
    }

    pub fn platform(&self) -> &str {
        self.metadata(MetadataKey::Platform)
    }

    pub fn version(&self) -> &str {
        self.metadata(MetadataKey::Version)
    }

    pub fn country(&self) -> &str {
        self.metadata(MetadataKey::Country)
    }

    pub fn method(&self) -> &str {
        self.metadata(MetadataKey::Method)
    }

    pub fn x_request_id(&self) -> &str {
        self.metadata(MetadataKey::XRequestId)
    }
}
