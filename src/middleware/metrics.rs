//! Per-call RPC metrics.

use std::task::{Context, Poll};
use std::time::Instant;

use futures_util::future::BoxFuture;
use tower::{Layer, Service};

use crate::observability::metrics::{self, CallLabels};
use crate::rpc::{RpcError, RpcRequest, RpcResponse};

/// Method label used for calls to unknown methods.
pub const METHOD_NOT_FOUND_LABEL: &str = "methodNotFound";

/// Server label used when no server name is configured.
pub const DEFAULT_SERVER_LABEL: &str = "rpc";

#[derive(Debug, Clone)]
pub struct MetricsLayer {
    server: String,
    enabled: bool,
}

impl MetricsLayer {
    pub fn new(server: &str) -> Self {
        let server = if server.is_empty() {
            DEFAULT_SERVER_LABEL
        } else {
            server
        };
        Self {
            server: server.to_string(),
            enabled: true,
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

impl<S> Layer<S> for MetricsLayer {
    type Service = Metrics<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Metrics {
            inner,
            server: self.server.clone(),
            enabled: self.enabled,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Metrics<S> {
    inner: S,
    server: String,
    enabled: bool,
}

/// Label values for a finished call.
pub fn call_labels(req: &RpcRequest, resp: &RpcResponse, server: &str) -> CallLabels {
    let method = match &resp.error {
        Some(e) if e.code == RpcError::METHOD_NOT_FOUND => METHOD_NOT_FOUND_LABEL.to_string(),
        _ if req.namespace.is_empty() => req.method.clone(),
        _ => format!("{}.{}", req.namespace, req.method),
    };
    CallLabels {
        method,
        code: resp.code_label(),
        platform: req.ctx.platform().to_string(),
        version: req.ctx.version().to_string(),
        server: server.to_string(),
    }
}

impl<S> Service<RpcRequest> for Metrics<S>
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
        if !self.enabled {
            return Box::pin(self.inner.call(req));
        }

        let labelled = RpcRequest {
            id: None,
            namespace: req.namespace.clone(),
            method: req.method.clone(),
            params: serde_json::Value::Null,
            ctx: req.ctx.clone(),
        };
        let server = self.server.clone();
        let start = Instant::now();
        let fut = self.inner.call(req);

        Box::pin(async move {
            let resp = fut.await?;
            metrics::record_call(&call_labels(&labelled, &resp, &server), start.elapsed());
            Ok(resp)
        })
    }
}
