//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → TraceConfig (validated, immutable)
//!     → TraceStack (gatekeeper, layers) and logging init
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    HeadersConfig, LogFormat, LoggingConfig, MetricsConfig, ServerConfig, TraceConfig,
    TracingConfig,
};
pub use validation::ValidationError;
