//! RPC interceptor chain.
//!
//! # Data Flow
//! ```text
//! RpcRequest
//!     → devel.rs (devel flag on the context)
//!     → headers.rs (client metadata, request id)
//!     → timing.rs (gate: timing; start clock)
//!     → access_log.rs / error_log.rs (one log line, internal error masking)
//!     → metrics.rs (counters, histograms)
//!     → query_trace.rs (gate: session; open, publish id)
//!     → handler (sub-operations store events via capture::QueryHook)
//!     ← query_trace.rs (pop session → DurationSQL, SQL)
//!     ← timing.rs (DurationLocal = wall - remote - diff)
//! RpcResponse (+ extensions)
//! ```
//!
//! # Design Decisions
//! - Every interceptor is a `tower::Layer`; inner service errors pass
//!   through unchanged
//! - Gate decisions are per call and never fail the call
//! - Tracing state is owned by one `Tracer` shared via `Arc`

pub mod access_log;
pub mod devel;
pub mod error_log;
pub mod gate;
pub mod headers;
pub mod metrics;
pub mod query_trace;
pub mod stack;
pub mod timing;

pub use access_log::{AccessLogLayer, LogAttrs, LogAttrsFn};
pub use devel::DevelLayer;
pub use error_log::ErrorLogLayer;
pub use gate::{allow, query_flag, Access, AllowDebugFn, Gatekeeper};
pub use headers::HeadersLayer;
pub use metrics::MetricsLayer;
pub use query_trace::QueryTraceLayer;
pub use stack::TraceStack;
pub use timing::TimingLayer;
