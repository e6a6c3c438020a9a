//! rpc-trace demo runner.
//!
//! Drives a sample `arith` service through the full interceptor chain and
//! prints each JSON-RPC response, extensions included.
//!
//! ```text
//! rpc-trace --calls 4 --query "d=true&s=true"
//! rpc-trace --config trace.toml --devel
//! ```

use std::convert::Infallible;
use std::path::PathBuf;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use clap::Parser;
use futures_util::future::BoxFuture;
use serde_json::{json, Value};
use tower::{Service, ServiceExt};

use rpc_trace::capture::QueryHook;
use rpc_trace::config::{load_config, TraceConfig};
use rpc_trace::observability::{logging, metrics};
use rpc_trace::{CallContext, RpcError, RpcRequest, RpcResponse, TraceStack, Tracer};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Parser)]
#[command(name = "rpc-trace")]
#[command(about = "Run sample RPC calls through the tracing interceptor chain", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of concurrent calls.
    #[arg(short = 'n', long, default_value_t = 4)]
    calls: usize,

    /// Trace every call regardless of the request predicates.
    #[arg(long)]
    devel: bool,

    /// Query string of the simulated transport request.
    #[arg(short, long, default_value = "d=true&s=true")]
    query: String,
}

/// Sample service issuing fake queries through the producer hook.
#[derive(Clone)]
struct ArithService {
    hook: QueryHook,
}

impl Service<RpcRequest> for ArithService {
    type Response = RpcResponse;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<RpcResponse, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: RpcRequest) -> Self::Future {
        let hook = self.hook.clone();
        Box::pin(async move {
            let ctx = req.ctx;
            let a = req.params["a"].as_i64().unwrap_or_default();
            let b = req.params["b"].as_i64().unwrap_or_default();

            hook.observe(&ctx, format!("SELECT * FROM operands WHERE a = {}", a), sleep_ms(2))
                .await;

            let tx = ctx.clone().with_trace_group("tx");
            hook.observe(&tx, "BEGIN", sleep_ms(1)).await;
            hook.observe(&tx.clone().with_trace_group("batch"), "INSERT INTO results VALUES (...)", sleep_ms(3))
                .await;
            hook.observe(&tx, "COMMIT", sleep_ms(1)).await;

            // detached write finishing after the session is closed; dropped by the buffer
            let late_ctx = ctx.clone();
            let late_hook = hook.clone();
            tokio::spawn(async move {
                let stash = late_hook.before_operation(&late_ctx);
                sleep_ms(20).await;
                late_hook.record(&late_ctx, stash, "INSERT INTO audit_log VALUES (...)");
            });

            if b == 0 {
                return Ok(RpcResponse::failure(req.id, RpcError::new(500, "integer divide by zero")));
            }
            Ok(RpcResponse::success(req.id, json!({"Quo": a / b, "rem": a % b})))
        })
    }
}

async fn sleep_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

fn request(i: usize, query: &str) -> Result<RpcRequest, BoxError> {
    let (parts, _) = http::Request::builder()
        .method("POST")
        .uri(format!("/rpc?{}", query))
        .header("Platform", "cli")
        .header("Version", env!("CARGO_PKG_VERSION"))
        .body(())?
        .into_parts();

    Ok(RpcRequest::new("arith", "divide", json!({"a": 100 + i, "b": i % 4}))
        .with_id(Value::from(i))
        .with_context(CallContext::new().with_transport(parts)))
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => TraceConfig::default(),
    };
    if cli.devel {
        config.tracing.devel = true;
    }

    logging::init_logging(&config.logging)?;
    metrics::describe();

    tracing::info!(
        calls = cli.calls,
        devel = config.tracing.devel,
        query = %cli.query,
        "rpc-trace starting"
    );

    let tracer = Arc::new(Tracer::new());
    let stack = TraceStack::new(config, tracer.clone());
    let svc = stack.service(ArithService {
        hook: tracer.query_hook(),
    });

    let mut tasks = Vec::with_capacity(cli.calls);
    for i in 0..cli.calls {
        let svc = svc.clone();
        let req = request(i, &cli.query)?;
        tasks.push(tokio::spawn(async move { svc.oneshot(req).await }));
    }

    for task in tasks {
        let resp = task.await??;
        println!("{}", serde_json::to_string(&resp)?);
    }

    // let the detached writes land on their closed sessions
    sleep_ms(50).await;
    tracing::info!(
        sessions_issued = tracer.allocator().last_issued().0,
        open_sessions = tracer.buffer().open_sessions(),
        "Done"
    );
    Ok(())
}
