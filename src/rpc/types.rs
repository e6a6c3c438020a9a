//! Request, response and error types.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::context::CallContext;
use crate::timing::TimingExtensions;

pub const JSONRPC_VERSION: &str = "2.0";

/// An inbound call after transport decoding.
#[derive(Debug, Clone)]
pub struct RpcRequest {
    pub id: Option<Value>,
    pub namespace: String,
    pub method: String,
    pub params: Value,
    pub ctx: CallContext,
}

impl RpcRequest {
    pub fn new(namespace: impl Into<String>, method: impl Into<String>, params: Value) -> Self {
        Self {
            id: None,
            namespace: namespace.into(),
            method: method.into(),
            params,
            ctx: CallContext::new(),
        }
    }

    pub fn with_id(mut self, id: Value) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_context(mut self, ctx: CallContext) -> Self {
        self.ctx = ctx;
        self
    }

    /// `namespace.method`, prefixed with `server.` when a server name is set.
    pub fn full_method(&self, server: &str) -> String {
        full_method_name(server, &self.namespace, &self.method)
    }
}

/// Error object of a JSON-RPC response.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[error("{message}")]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL: i32 = 500;

    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Server-side failures: code 500 or any negative (protocol) code.
    pub fn is_internal(&self) -> bool {
        self.code == Self::INTERNAL || self.code < 0
    }
}

/// Outbound response, including the optional timing side-channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcResponse {
    pub jsonrpc: &'static str,
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
    #[serde(skip_serializing_if = "TimingExtensions::is_empty")]
    pub extensions: TimingExtensions,
}

impl RpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: Some(result),
            error: None,
            extensions: TimingExtensions::default(),
        }
    }

    pub fn failure(id: Option<Value>, error: RpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: None,
            error: Some(error),
            extensions: TimingExtensions::default(),
        }
    }

    /// Error code, or `""` for successful responses.
    pub fn code_label(&self) -> String {
        self.error
            .as_ref()
            .map(|e| e.code.to_string())
            .unwrap_or_default()
    }
}

/// Returns `namespace.method` or `server.namespace.method`.
pub fn full_method_name(server: &str, namespace: &str, method: &str) -> String {
    let name = format!("{}.{}", namespace, method);
    if server.is_empty() {
        name
    } else {
        format!("{}.{}", server, name)
    }
}
