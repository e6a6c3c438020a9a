//! Internal error logging and masking.
//!
//! Responses carrying an error with code 500 or a negative code are logged
//! at error level with the full error, then masked: the client sees
//! `Internal error` and no error data.

use std::task::{Context, Poll};
use std::time::Instant;

use futures_util::future::BoxFuture;
use tower::{Layer, Service};

use crate::middleware::access_log::{attrs_for, LogAttrs, LogAttrsFn};
use crate::rpc::{RpcRequest, RpcResponse};

/// Message that replaces internal error details.
pub const MASKED_MESSAGE: &str = "Internal error";

#[derive(Clone, Default)]
pub struct ErrorLogLayer {
    server: String,
    attrs: Option<LogAttrsFn>,
}

impl ErrorLogLayer {
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

impl<S> Layer<S> for ErrorLogLayer {
    type Service = ErrorLog<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ErrorLog {
            inner,
            server: self.server.clone(),
            attrs: self.attrs.clone(),
        }
    }
}

#[derive(Clone)]
pub struct ErrorLog<S> {
    inner: S,
    server: String,
    attrs: Option<LogAttrsFn>,
}

impl<S> Service<RpcRequest> for ErrorLog<S>
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
            let mut resp = fut.await?;
            if !resp.error.as_ref().is_some_and(|e| e.is_internal()) {
                return Ok(resp);
            }

            // the skip decision only silences the log line, masking always applies
            let extra = attrs_for(&attrs, &logged, &resp);
            if let Some(error) = resp.error.as_mut() {
                if extra != LogAttrs::Skip {
                    let ctx = &logged.ctx;
                    let elapsed = start.elapsed();
                    tracing::error!(
                        ip = %ctx.ip(),
                        platform = %ctx.platform(),
                        version = %ctx.version(),
                        method = %logged.full_method(&server),
                        duration = ?elapsed,
                        duration_ms = elapsed.as_millis() as u64,
                        params = %logged.params,
                        code = error.code,
                        err = %error,
                        data = ?error.data,
                        user_agent = %ctx.user_agent(),
                        x_request_id = %ctx.x_request_id(),
                        attrs = %extra.render(),
                        "rpc error"
                    );
                }

                error.message = MASKED_MESSAGE.to_string();
                error.data = None;
            }
            Ok(resp)
        })
    }
}
