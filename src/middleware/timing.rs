//! `DurationLocal` interceptor.
//!
//! Wraps the rest of the chain, measures wall time and composes
//! `DurationLocal` from it and the `DurationRemote` / `DurationDiff` hints
//! that inner layers left on the response.

use std::task::{Context, Poll};
use std::time::Instant;

use futures_util::future::BoxFuture;
use tower::{Layer, Service};

use crate::middleware::gate::Gatekeeper;
use crate::rpc::{RpcRequest, RpcResponse};
use crate::timing::composer;

/// Layer adding `DurationLocal` to responses of gated calls.
#[derive(Debug, Clone)]
pub struct TimingLayer {
    gate: Gatekeeper,
}

impl TimingLayer {
    pub fn new(gate: Gatekeeper) -> Self {
        Self { gate }
    }
}

impl<S> Layer<S> for TimingLayer {
    type Service = Timing<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Timing {
            inner,
            gate: self.gate.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Timing<S> {
    inner: S,
    gate: Gatekeeper,
}

impl<S> Service<RpcRequest> for Timing<S>
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

    fn call(&mut self, req: RpcRequest) -> Self::Future {
        if !self.gate.allows_timing(&req.ctx) {
            return Box::pin(self.inner.call(req));
        }

        let start = Instant::now();
        let fut = self.inner.call(req);
        Box::pin(async move {
            let mut resp = fut.await?;
            composer::compose(start, Instant::now(), &mut resp.extensions);
            Ok(resp)
        })
    }
}
