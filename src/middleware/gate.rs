//! Per-call tracing decision.
//!
//! # Decision
//! ```text
//! devel flag set                        → Full
//! no transport request on the context   → Denied
//! timing predicate false                → Denied
//! query text predicate true             → Full
//! otherwise                             → TimingOnly
//! ```

use std::fmt;
use std::sync::Arc;

use http::request::Parts;

use crate::config::TracingConfig;
use crate::context::CallContext;

/// Predicate over the inbound transport request.
pub type AllowDebugFn = Arc<dyn Fn(&Parts) -> bool + Send + Sync>;

/// What a call is allowed to expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Tracing is off for this call.
    Denied,
    /// Durations only, no raw query text.
    TimingOnly,
    /// Durations and raw query text.
    Full,
}

/// Evaluates `predicate` unless `is_devel` short-circuits it.
///
/// Without a transport request attached to the call this is `false`.
pub fn allow(is_devel: bool, ctx: &CallContext, predicate: &AllowDebugFn) -> bool {
    if is_devel {
        return true;
    }
    ctx.transport().is_some_and(|parts| predicate(parts))
}

/// Predicate that is true when the query string has `param=true`.
pub fn query_flag(param: &str) -> AllowDebugFn {
    let param = param.to_string();
    Arc::new(move |parts: &Parts| {
        parts
            .uri
            .query()
            .unwrap_or_default()
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .any(|(key, value)| key == param && value == "true")
    })
}

fn never() -> AllowDebugFn {
    Arc::new(|_: &Parts| false)
}

/// Decides per call whether tracing is active and how much it may expose.
#[derive(Clone)]
pub struct Gatekeeper {
    enabled: bool,
    is_devel: bool,
    allow_timing: AllowDebugFn,
    allow_query_text: AllowDebugFn,
}

impl Gatekeeper {
    pub fn new(is_devel: bool, allow_timing: AllowDebugFn, allow_query_text: AllowDebugFn) -> Self {
        Self {
            enabled: true,
            is_devel,
            allow_timing,
            allow_query_text,
        }
    }

    /// Gatekeeper driven by `?<timing_param>=true` and `?<query_text_param>=true`.
    pub fn from_config(config: &TracingConfig) -> Self {
        if !config.enabled {
            return Self::disabled();
        }
        Self::new(
            config.devel,
            query_flag(&config.timing_param),
            query_flag(&config.query_text_param),
        )
    }

    /// Denies every call.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            is_devel: false,
            allow_timing: never(),
            allow_query_text: never(),
        }
    }

    /// Coarse check: may this call report timings at all.
    pub fn allows_timing(&self, ctx: &CallContext) -> bool {
        self.enabled && allow(self.is_devel, ctx, &self.allow_timing)
    }

    pub fn evaluate(&self, ctx: &CallContext) -> Access {
        if !self.allows_timing(ctx) {
            return Access::Denied;
        }
        if allow(self.is_devel, ctx, &self.allow_query_text) {
            Access::Full
        } else {
            Access::TimingOnly
        }
    }
}

impl fmt::Debug for Gatekeeper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gatekeeper")
            .field("enabled", &self.enabled)
            .field("is_devel", &self.is_devel)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Request;

    fn ctx_with_uri(uri: &str) -> CallContext {
        let (parts, _) = Request::builder().uri(uri).body(()).unwrap().into_parts();
        CallContext::new().with_transport(parts)
    }

    fn gate() -> Gatekeeper {
        Gatekeeper::from_config(&TracingConfig::default())
    }

    #[test]
    fn test_query_flag() {
        let flag = query_flag("d");
        let parts = |uri: &str| Request::builder().uri(uri).body(()).unwrap().into_parts().0;
        assert!(flag(&parts("/rpc?d=true")));
        assert!(flag(&parts("/rpc?x=1&d=true")));
        assert!(!flag(&parts("/rpc?d=1")));
        assert!(!flag(&parts("/rpc?dd=true")));
        assert!(!flag(&parts("/rpc")));
    }

    #[test]
    fn test_devel_allows_everything() {
        let gate = Gatekeeper::new(true, never(), never());
        assert_eq!(gate.evaluate(&CallContext::new()), Access::Full);
    }

    #[test]
    fn test_no_transport_denies() {
        assert_eq!(gate().evaluate(&CallContext::new()), Access::Denied);
    }

    #[test]
    fn test_predicates_are_independent() {
        let gate = gate();
        assert_eq!(gate.evaluate(&ctx_with_uri("/rpc")), Access::Denied);
        assert_eq!(gate.evaluate(&ctx_with_uri("/rpc?d=true")), Access::TimingOnly);
        assert_eq!(gate.evaluate(&ctx_with_uri("/rpc?d=true&s=true")), Access::Full);
        // query text alone does not enable tracing
        assert_eq!(gate.evaluate(&ctx_with_uri("/rpc?s=true")), Access::Denied);
    }

    #[test]
    fn test_disabled_config() {
        let config = TracingConfig {
            enabled: false,
            devel: true,
            ..Default::default()
        };
        let gate = Gatekeeper::from_config(&config);
        assert_eq!(gate.evaluate(&ctx_with_uri("/rpc?d=true")), Access::Denied);
    }
}
