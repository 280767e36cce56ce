//! JSON-RPC adapter: a `ChainResolver` over any caller-supplied transport.
//!
//! The scanner never opens connections itself. Callers plug in whatever
//! client they already run (HTTP, IPC, a recorded fixture) by implementing
//! [`RpcTransport`]; [`JsonRpcResolver`] maps the resolver contract onto the
//! standard `eth_*` methods.

use alloy_primitives::B256;
use chainlog_core::{Block, ChainResolver, Receipt, ResolutionError, Transaction};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// An outgoing JSON-RPC 2.0 call.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: String,
    pub params: Vec<Value>,
}

impl JsonRpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method: method.into(),
            params,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

/// A node's reply. Exactly one of `result` and `error` is expected.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// The result value; a missing result reads as `null`.
    pub fn into_result(self) -> Result<Value, JsonRpcError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

/// Errors raised while talking to a node.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The transport could not deliver the request or read the reply.
    #[error("Transport failure: {0}")]
    Io(String),

    /// JSON-RPC protocol-level error returned by the node.
    #[error("RPC error {}: {}", .0.code, .0.message)]
    Rpc(JsonRpcError),

    /// The result did not have the expected shape.
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),
}

impl From<TransportError> for ResolutionError {
    fn from(err: TransportError) -> Self {
        ResolutionError::Transport(err.to_string())
    }
}

/// A blocking JSON-RPC transport.
///
/// # Thread Safety
/// Implementations must be `Send + Sync`; one transport serves every scan
/// sharing the resolver.
pub trait RpcTransport: Send + Sync {
    fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError>;
}

/// Resolves node data through `eth_getTransactionByHash`,
/// `eth_getBlockByNumber` and `eth_getTransactionReceipt`.
pub struct JsonRpcResolver<T> {
    transport: T,
    next_id: AtomicU64,
}

impl<T: RpcTransport> JsonRpcResolver<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Call `method` and deserialize a non-null result. `null` means the node
    /// does not know the object.
    fn call<R: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
        what: impl FnOnce() -> String,
    ) -> Result<R, ResolutionError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let response = self.transport.send(JsonRpcRequest::new(id, method, params))?;
        let value = response.into_result().map_err(TransportError::Rpc)?;
        if value.is_null() {
            return Err(ResolutionError::not_found(what()));
        }
        serde_json::from_value(value).map_err(|e| TransportError::from(e).into())
    }
}

impl<T: RpcTransport> ChainResolver for JsonRpcResolver<T> {
    fn resolve_transaction(&self, hash: B256) -> Result<Transaction, ResolutionError> {
        self.call(
            "eth_getTransactionByHash",
            vec![Value::String(hash.to_string())],
            || format!("transaction {hash}"),
        )
    }

    fn resolve_block(&self, number: u64) -> Result<Block, ResolutionError> {
        self.call(
            "eth_getBlockByNumber",
            vec![Value::String(format!("{number:#x}")), Value::Bool(true)],
            || format!("block {number}"),
        )
    }

    fn fetch_receipt(&self, transaction_hash: B256) -> Result<Receipt, ResolutionError> {
        self.call(
            "eth_getTransactionReceipt",
            vec![Value::String(transaction_hash.to_string())],
            || format!("receipt for {transaction_hash}"),
        )
    }
}
