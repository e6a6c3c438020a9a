//! JSON-RPC call model shared by all interceptors.
//!
//! Every interceptor is a `tower::Service<RpcRequest, Response = RpcResponse>`
//! wrapping the next one. Dispatch and transport live outside this crate.

pub mod types;

pub use types::{full_method_name, RpcError, RpcRequest, RpcResponse, JSONRPC_VERSION};
