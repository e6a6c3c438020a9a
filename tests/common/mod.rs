//! Shared utilities for the interceptor chain integration tests.

#![allow(dead_code)]

use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures_util::future::BoxFuture;
use serde_json::{json, Value};
use tower::util::BoxCloneService;
use tower::Service;

use rpc_trace::capture::QueryHook;
use rpc_trace::config::TraceConfig;
use rpc_trace::{CallContext, RpcError, RpcRequest, RpcResponse, TraceStack, Tracer};

pub type TestService = BoxCloneService<RpcRequest, RpcResponse, Infallible>;

/// Default configuration with the development flag set as given.
pub fn config(devel: bool) -> TraceConfig {
    let mut config = TraceConfig::default();
    config.tracing.devel = devel;
    config
}

/// Request carrying a transport request for `/rpc?<query>`.
pub fn request(n: u64, query: &str) -> RpcRequest {
    let uri = if query.is_empty() {
        "/rpc".to_string()
    } else {
        format!("/rpc?{}", query)
    };
    let (parts, _) = http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("User-Agent", "integration-test")
        .header("Platform", "test")
        .header("Version", "1.0")
        .header("X-Forwarded-For", "203.0.113.7, 10.0.0.1")
        .body(())
        .unwrap()
        .into_parts();

    RpcRequest::new("arith", "multiply", json!({ "n": n }))
        .with_id(Value::from(n))
        .with_context(CallContext::new().with_transport(parts))
}

/// Builds the full chain around `inner` and returns it with its tracer.
pub fn stack<S>(config: TraceConfig, inner: impl FnOnce(QueryHook) -> S) -> (Arc<Tracer>, TestService)
where
    S: Service<RpcRequest, Response = RpcResponse, Error = Infallible> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    let stack = TraceStack::new(config, Arc::new(Tracer::new()));
    let svc = stack.service(inner(stack.tracer().query_hook()));
    (stack.tracer().clone(), svc)
}

/// Runs `queries` fake queries tagged with the request's `n`, then answers.
#[derive(Clone)]
pub struct QueryService {
    pub hook: QueryHook,
    pub queries: usize,
    pub error: Option<RpcError>,
}

impl QueryService {
    pub fn new(hook: QueryHook, queries: usize) -> Self {
        Self {
            hook,
            queries,
            error: None,
        }
    }

    pub fn failing(mut self, error: RpcError) -> Self {
        self.error = Some(error);
        self
    }
}

impl Service<RpcRequest> for QueryService {
    type Response = RpcResponse;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<RpcResponse, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: RpcRequest) -> Self::Future {
        let hook = self.hook.clone();
        let queries = self.queries;
        let error = self.error.clone();
        Box::pin(async move {
            let n = req.params["n"].as_u64().unwrap_or_default();
            for i in 0..queries {
                let text = format!("SELECT {} FROM numbers -- {}", n, i);
                hook.observe(&req.ctx, text, tokio::task::yield_now()).await;
            }
            match error {
                Some(error) => Ok(RpcResponse::failure(req.id, error)),
                None => Ok(RpcResponse::success(req.id, json!(n * 2))),
            }
        })
    }
}

/// Records one query, then panics.
#[derive(Clone)]
pub struct PanicService {
    pub hook: QueryHook,
}

impl Service<RpcRequest> for PanicService {
    type Response = RpcResponse;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<RpcResponse, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: RpcRequest) -> Self::Future {
        let hook = self.hook.clone();
        Box::pin(async move {
            hook.observe(&req.ctx, "SELECT 1", tokio::task::yield_now()).await;
            blow_up()
        })
    }
}

fn blow_up() -> Result<RpcResponse, Infallible> {
    panic!("handler blew up")
}

/// Hangs inside a query that never finishes.
#[derive(Clone)]
pub struct StalledService {
    pub hook: QueryHook,
}

impl Service<RpcRequest> for StalledService {
    type Response = RpcResponse;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<RpcResponse, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: RpcRequest) -> Self::Future {
        let hook = self.hook.clone();
        Box::pin(async move {
            hook.observe(&req.ctx, "SELECT pg_sleep(3600)", tokio::time::sleep(Duration::from_secs(3600)))
                .await;
            Ok(RpcResponse::success(req.id, Value::Null))
        })
    }
}
