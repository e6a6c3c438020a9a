//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Interceptors produce:
//!     → logging.rs (subscriber for structured `tracing` events)
//!     → metrics.rs (counters and histograms via the `metrics` facade)
//!
//! Consumers:
//!     → Log aggregation (stdout, compact or JSON)
//!     → Whatever recorder the host process installs
//! ```

pub mod logging;
pub mod metrics;
