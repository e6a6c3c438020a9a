//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files.

use serde::{Deserialize, Serialize};

/// Root configuration for the tracing middleware stack.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct TraceConfig {
    /// Server identity used in log and metric labels.
    pub server: ServerConfig,

    /// Gatekeeper and capture settings.
    pub tracing: TracingConfig,

    /// Header extraction settings.
    pub headers: HeadersConfig,

    /// Log subscriber settings.
    pub logging: LoggingConfig,

    /// Metric recording settings.
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Prefix for full method names; empty means `namespace.method`.
    pub name: String,
}

/// Gatekeeper configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TracingConfig {
    /// Install the timing and query trace interceptors at all.
    pub enabled: bool,

    /// Development environment: trace every call with full query text.
    pub devel: bool,

    /// Query parameter that enables timing (`?d=true`).
    pub timing_param: String,

    /// Query parameter that additionally exposes query text (`?s=true`).
    pub query_text_param: String,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            devel: false,
            timing_param: "d".to_string(),
            query_text_param: "s".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct HeadersConfig {
    /// Generate an X-Request-ID when the client sends none (or an invalid one).
    pub generate_request_id: bool,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive (trace, debug, info, warn, error).
    pub level: String,

    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct MetricsConfig {
    /// Record per-call counters and histograms through the `metrics` facade.
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TraceConfig::default();
        assert!(config.tracing.enabled);
        assert!(!config.tracing.devel);
        assert_eq!(config.tracing.timing_param, "d");
        assert_eq!(config.tracing.query_text_param, "s");
        assert_eq!(config.logging.format, LogFormat::Compact);
        assert!(config.metrics.enabled);
    }

    #[test]
    fn test_partial_toml() {
        let config: TraceConfig = toml::from_str(
            r#"
            [server]
            name = "api"

            [tracing]
            devel = true

            [logging]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.name, "api");
        assert!(config.tracing.devel);
        assert_eq!(config.tracing.timing_param, "d");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "info");
    }
}
