//! Development-environment flag on the call context.

use std::task::{Context, Poll};

use tower::{Layer, Service};

use crate::rpc::RpcRequest;

#[derive(Debug, Clone, Copy)]
pub struct DevelLayer {
    is_devel: bool,
}

impl DevelLayer {
    pub fn new(is_devel: bool) -> Self {
        Self { is_devel }
    }
}

impl<S> Layer<S> for DevelLayer {
    type Service = Devel<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Devel {
            inner,
            is_devel: self.is_devel,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Devel<S> {
    inner: S,
    is_devel: bool,
}

impl<S> Service<RpcRequest> for Devel<S>
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
        req.ctx = req.ctx.with_devel(self.is_devel);
        self.inner.call(req)
    }
}
