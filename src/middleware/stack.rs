//! Canonical interceptor chain assembled from configuration.

use std::sync::Arc;

use tower::util::BoxCloneService;
use tower::{Service, ServiceBuilder};

use crate::capture::Tracer;
use crate::config::TraceConfig;
use crate::middleware::access_log::{AccessLogLayer, LogAttrsFn};
use crate::middleware::devel::DevelLayer;
use crate::middleware::error_log::ErrorLogLayer;
use crate::middleware::gate::Gatekeeper;
use crate::middleware::headers::HeadersLayer;
use crate::middleware::metrics::MetricsLayer;
use crate::middleware::query_trace::QueryTraceLayer;
use crate::middleware::timing::TimingLayer;
use crate::rpc::{RpcRequest, RpcResponse};

/// Builds the interceptor chain around an RPC service.
///
/// Order, outermost first: devel, headers, timing, access log, error log,
/// metrics, query trace. Timing wraps everything so `DurationLocal` covers
/// the whole chain; query trace sits closest to the handler so the session
/// spans exactly the handler's sub-operations.
#[derive(Clone)]
pub struct TraceStack {
    config: TraceConfig,
    tracer: Arc<Tracer>,
    gate: Gatekeeper,
    log_attrs: Option<LogAttrsFn>,
}

impl TraceStack {
    pub fn new(config: TraceConfig, tracer: Arc<Tracer>) -> Self {
        let gate = Gatekeeper::from_config(&config.tracing);
        Self {
            config,
            tracer,
            gate,
            log_attrs: None,
        }
    }

    /// Replace the config-derived gatekeeper, e.g. with custom predicates.
    pub fn with_gatekeeper(mut self, gate: Gatekeeper) -> Self {
        self.gate = gate;
        self
    }

    /// Extra fields (or skip decisions) for access and error log lines.
    pub fn with_log_attrs(mut self, attrs: LogAttrsFn) -> Self {
        self.log_attrs = Some(attrs);
        self
    }

    /// Capture state shared by every service this stack builds.
    pub fn tracer(&self) -> &Arc<Tracer> {
        &self.tracer
    }

    pub fn service<S>(&self, inner: S) -> BoxCloneService<RpcRequest, RpcResponse, S::Error>
    where
        S: Service<RpcRequest, Response = RpcResponse> + Clone + Send + 'static,
        S::Future: Send + 'static,
        S::Error: Send + 'static,
    {
        let server = self.config.server.name.as_str();

        let mut access_log = AccessLogLayer::new(server);
        let mut error_log = ErrorLogLayer::new(server);
        if let Some(attrs) = &self.log_attrs {
            access_log = access_log.with_attrs(attrs.clone());
            error_log = error_log.with_attrs(attrs.clone());
        }

        let svc = ServiceBuilder::new()
            .layer(DevelLayer::new(self.config.tracing.devel))
            .layer(HeadersLayer::new().generate_request_id(self.config.headers.generate_request_id))
            .layer(TimingLayer::new(self.gate.clone()))
            .layer(access_log)
            .layer(error_log)
            .layer(MetricsLayer::new(server).enabled(self.config.metrics.enabled))
            .layer(QueryTraceLayer::new(self.tracer.clone(), self.gate.clone()))
            .service(inner);

        tracing::debug!(
            server = %server,
            devel = self.config.tracing.devel,
            tracing_enabled = self.config.tracing.enabled,
            "Interceptor chain built"
        );
        BoxCloneService::new(svc)
    }
}
