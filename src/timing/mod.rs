//! Response timing decomposition.
//!
//! # Data Flow
//! ```text
//! inner call returns RpcResponse
//!     → extensions.rs (DurationRemote / DurationDiff hints set by inner layers)
//!     → composer.rs (wall time minus hints → DurationLocal)
//!     → extensions serialized next to the JSON-RPC result
//! ```
//!
//! # Design Decisions
//! - Whole milliseconds, truncated
//! - `-1` in `DurationLocal` is a sentinel set by remote-only layers
//! - Negative local durations are reported as-is

pub mod composer;
pub mod extensions;

pub use composer::{compose, local_duration, whole_millis};
pub use extensions::{TimingExtensions, DURATION_LOCAL_SUPPRESSED};
