//! Metrics recording.
//!
//! # Metrics
//! - `app_rpc_error_requests_total` (counter): error responses by method and code
//! - `app_rpc_responses_duration_seconds` (histogram): response time
//! - `app_rpc_trace_sessions_total` (counter): closed trace sessions
//! - `app_rpc_trace_events` (histogram): events captured per session
//!
//! Labels for the RPC metrics: method, code, platform, version, server.
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; exporting is left to the host
//!   process, which installs a recorder of its choice
//! - Without an installed recorder every call here is a no-op

use std::time::Duration;

pub const RPC_ERRORS_TOTAL: &str = "app_rpc_error_requests_total";
pub const RPC_DURATION_SECONDS: &str = "app_rpc_responses_duration_seconds";
pub const TRACE_SESSIONS_TOTAL: &str = "app_rpc_trace_sessions_total";
pub const TRACE_EVENTS: &str = "app_rpc_trace_events";

/// Label values for one RPC call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallLabels {
    pub method: String,
    /// Error code, empty for successful calls.
    pub code: String,
    pub platform: String,
    pub version: String,
    pub server: String,
}

/// Register metric descriptions with the installed recorder.
pub fn describe() {
    metrics::describe_counter!(RPC_ERRORS_TOTAL, "Error requests count by method and error code.");
    metrics::describe_histogram!(
        RPC_DURATION_SECONDS,
        metrics::Unit::Seconds,
        "Response time by method and error code."
    );
    metrics::describe_counter!(TRACE_SESSIONS_TOTAL, "Closed query trace sessions.");
    metrics::describe_histogram!(TRACE_EVENTS, "Events captured per trace session.");
}

/// Record a finished RPC call.
pub fn record_call(labels: &CallLabels, elapsed: Duration) {
    if !labels.code.is_empty() {
        metrics::counter!(
            RPC_ERRORS_TOTAL,
            "method" => labels.method.clone(),
            "code" => labels.code.clone(),
            "platform" => labels.platform.clone(),
            "version" => labels.version.clone(),
            "server" => labels.server.clone()
        )
        .increment(1);
    }

    metrics::histogram!(
        RPC_DURATION_SECONDS,
        "method" => labels.method.clone(),
        "code" => labels.code.clone(),
        "platform" => labels.platform.clone(),
        "version" => labels.version.clone(),
        "server" => labels.server.clone()
    )
    .record(elapsed.as_secs_f64());
}

/// Record a closed trace session.
pub fn record_trace_session(events: usize) {
    metrics::counter!(TRACE_SESSIONS_TOTAL).increment(1);
    metrics::histogram!(TRACE_EVENTS).record(events as f64);
}
