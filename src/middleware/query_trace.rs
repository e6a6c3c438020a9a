//! Query trace interceptor.
//!
//! # States
//! ```text
//! Idle → SessionOpen: gatekeeper allows; id allocated, published on the
//!                     call context, session pushed
//! SessionOpen:        producers store events under the published id
//! SessionOpen → SessionClosing → Complete: inner call returns (ok or err);
//!                     session popped, DurationSQL and (Full access) SQL set
//! Idle → Complete:    gatekeeper denies; no id is allocated
//! ```
//!
//! # Failure Semantics
//! The session is owned by a `SessionGuard` held inside the returned future.
//! A panic in the inner call or a dropped (cancelled) future drops the guard,
//! which pops the session; the panic keeps unwinding untouched.

use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures_util::future::BoxFuture;
use tower::{Layer, Service};

use crate::capture::{Event, Tracer};
use crate::middleware::gate::{Access, Gatekeeper};
use crate::observability::metrics;
use crate::rpc::{RpcRequest, RpcResponse};
use crate::timing::{whole_millis, TimingExtensions};

/// Layer capturing sub-operation events for gated calls.
#[derive(Debug, Clone)]
pub struct QueryTraceLayer {
    tracer: Arc<Tracer>,
    gate: Gatekeeper,
}

impl QueryTraceLayer {
    pub fn new(tracer: Arc<Tracer>, gate: Gatekeeper) -> Self {
        Self { tracer, gate }
    }
}

impl<S> Layer<S> for QueryTraceLayer {
    type Service = QueryTrace<S>;

    fn layer(&self, inner: S) -> Self::Service {
        QueryTrace {
            inner,
            tracer: self.tracer.clone(),
            gate: self.gate.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct QueryTrace<S> {
    inner: S,
    tracer: Arc<Tracer>,
    gate: Gatekeeper,
}

impl<S> Service<RpcRequest> for QueryTrace<S>
where
    S: Service<RpcRequest, Response = RpcResponse>,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
{
    type Response = RpcResponse;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<RpcResponse, S::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: RpcRequest) -> Self::Future {
        let access = self.gate.evaluate(&req.ctx);
        if access == Access::Denied {
            return Box::pin(self.inner.call(req));
        }

        let session = self.tracer.open_session();
        req.ctx = req.ctx.with_session(session.id());
        let fut = self.inner.call(req);

        Box::pin(async move {
            let result = fut.await;
            let events = session.close();
            metrics::record_trace_session(events.len());

            let mut resp = result?;
            attach_events(&mut resp.extensions, events, access);
            Ok(resp)
        })
    }
}

/// Writes `DurationSQL` and, for [`Access::Full`], the events themselves.
///
/// Nothing is written when no events were captured.
pub fn attach_events(ext: &mut TimingExtensions, events: Vec<Event>, access: Access) {
    if events.is_empty() || access == Access::Denied {
        return;
    }

    let total: Duration = events.iter().map(|e| e.duration).sum();
    ext.duration_sql = Some(whole_millis(total));
    if access == Access::Full {
        ext.sql = Some(events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::TraceGroup;

    fn events() -> Vec<Event> {
        vec![
            Event::new("SELECT 1", TraceGroup::default(), Duration::from_micros(1_500)),
            Event::new("SELECT 2", TraceGroup::new("tx"), Duration::from_micros(2_700)),
        ]
    }

    #[test]
    fn test_attach_full() {
        let mut ext = TimingExtensions::default();
        attach_events(&mut ext, events(), Access::Full);
        assert_eq!(ext.duration_sql, Some(4));
        assert_eq!(ext.sql.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn test_attach_timing_only() {
        let mut ext = TimingExtensions::default();
        attach_events(&mut ext, events(), Access::TimingOnly);
        assert_eq!(ext.duration_sql, Some(4));
        assert!(ext.sql.is_none());
    }

    #[test]
    fn test_attach_nothing_without_events() {
        let mut ext = TimingExtensions::default();
        attach_events(&mut ext, Vec::new(), Access::Full);
        assert!(ext.is_empty());
    }
}
