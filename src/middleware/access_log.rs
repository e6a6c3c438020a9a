//! One structured log line per call.

use std::fmt::Write as _;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use futures_util::future::BoxFuture;
use tower::{Layer, Service};

use crate::rpc::{RpcRequest, RpcResponse};

/// Extra per-call log fields, or a request to drop the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogAttrs {
    Skip,
    Fields(Vec<(String, String)>),
}

impl LogAttrs {
    pub fn none() -> Self {
        LogAttrs::Fields(Vec::new())
    }

    /// Renders fields as `k=v k=v`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if let LogAttrs::Fields(fields) = self {
            for (key, value) in fields {
                if !out.is_empty() {
                    out.push(' ');
                }
                let _ = write!(out, "{}={:?}", key, value);
            }
        }
        out
    }
}

/// Computes extra log fields from the finished call.
pub type LogAttrsFn = Arc<dyn Fn(&RpcRequest, &RpcResponse) -> LogAttrs + Send + Sync>;

pub(crate) fn attrs_for(attrs: &Option<LogAttrsFn>, req: &RpcRequest, resp: &RpcResponse) -> LogAttrs {
    match attrs {
        Some(f) => f(req, resp),
        None => LogAttrs::none(),
    }
}

#[derive(Clone, Default)]
pub struct AccessLogLayer {
    server: String,
    attrs: Option<LogAttrsFn>,
}

impl AccessLogLayer {
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            attrs: None,
        }
    }

    pub fn with_attrs(mut self, attrs: LogAttrsFn) -> Self {
        self.attrs = Some(attrs);
        self
    }
}

impl<S> Layer<S> for AccessLogLayer {
    type Service = AccessLog<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AccessLog {
            inner,
            server: self.server.clone(),
            attrs: self.attrs.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AccessLog<S> {
    inner: S,
    server: String,
    attrs: Option<LogAttrsFn>,
}

impl<S> Service<RpcRequest> for AccessLog<S>
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
        let logged = req.clone();
        let server = self.server.clone();
        let attrs = self.attrs.clone();
        let start = Instant::now();
        let fut = self.inner.call(req);

        Box::pin(async move {
            let resp = fut.await?;

            let extra = attrs_for(&attrs, &logged, &resp);
            if extra == LogAttrs::Skip {
                return Ok(resp);
            }

            let ctx = &logged.ctx;
            tracing::info!(
                ip = %ctx.ip(),
                platform = %ctx.platform(),
                version = %ctx.version(),
                method = %logged.full_method(&server),
                duration = ?start.elapsed(),
                params = %logged.params,
                err = %resp.error.as_ref().map(ToString::to_string).unwrap_or_default(),
                user_agent = %ctx.user_agent(),
                country = %ctx.country(),
                x_request_id = %ctx.x_request_id(),
                notification = ctx.is_notification(),
                attrs = %extra.render(),
                "rpc"
            );
            Ok(resp)
        })
    }
}
