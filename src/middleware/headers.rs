//! Client metadata on the call context.
//!
//! Copies the client IP, User-Agent, Platform, Version, X-Country,
//! X-Request-ID and the method name from the transport request. Calls
//! without an id are marked as notifications. Calls without a transport
//! request keep their metadata, except for request id generation.

use std::task::{Context, Poll};

use tower::{Layer, Service};

use crate::context::headers::extract_metadata;
use crate::context::request_id;
use crate::context::MetadataKey;
use crate::rpc::RpcRequest;

#[derive(Debug, Clone, Copy, Default)]
pub struct HeadersLayer {
    generate_request_id: bool,
}

impl HeadersLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a missing or invalid X-Request-ID with a fresh one.
    pub fn generate_request_id(mut self, enabled: bool) -> Self {
        self.generate_request_id = enabled;
        self
    }
}

impl<S> Layer<S> for HeadersLayer {
    type Service = Headers<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Headers {
            inner,
            generate_request_id: self.generate_request_id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Headers<S> {
    inner: S,
    generate_request_id: bool,
}

impl<S> Service<RpcRequest> for Headers<S>
where
    S: Service<RpcRequest>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: RpcRequest) -> Self::Future {
        if let Some(parts) = req.ctx.transport_handle() {
            req.ctx = extract_metadata(req.ctx, &parts, &req.method);
        }
        if req.id.is_none() {
            req.ctx = req.ctx.with_notification();
        }
        if self.generate_request_id && !request_id::is_valid(req.ctx.x_request_id()) {
            let id = request_id::generate();
            tracing::trace!(x_request_id = %id, "Generated request id");
            req.ctx = req.ctx.with_metadata(MetadataKey::XRequestId, id);
        }
        self.inner.call(req)
    }
}
