//! Per-call diagnostic tracing for RPC middleware stacks.
//!
//! # Architecture Overview
//!
//! ```text
//!   RpcRequest ──▶ ┌──────────────────────── TraceStack ────────────────────────┐
//!                  │ devel → headers → timing → logs → metrics → query_trace    │──▶ handler
//!                  └────────────────────────────────────────────────────────────┘      │
//!                                         ▲                     │ session id           │
//!                                         │                     ▼                      ▼
//!                                  ┌─────────────┐      ┌──────────────┐      ┌──────────────┐
//!                                  │   timing    │      │   capture    │◀─────│  QueryHook   │
//!                                  │  composer   │      │ alloc+buffer │ store│ (producers)  │
//!                                  └─────────────┘      └──────────────┘      └──────────────┘
//!   RpcResponse ◀── extensions { DurationLocal, DurationRemote, DurationDiff, SQL, DurationSQL }
//! ```

pub mod capture;
pub mod config;
pub mod context;
pub mod middleware;
pub mod observability;
pub mod rpc;
pub mod timing;

pub use capture::{Event, EventBuffer, QueryHook, SessionId, TraceGroup, Tracer};
pub use config::TraceConfig;
pub use context::CallContext;
pub use middleware::{Gatekeeper, TraceStack};
pub use rpc::{RpcError, RpcRequest, RpcResponse};
pub use timing::TimingExtensions;
