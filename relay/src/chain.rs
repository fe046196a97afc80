//! Thin JSON-RPC chain reader.
//!
//! The wallet and chain layer proper live outside this repository; the
//! hub only needs a handful of reads to fill its dashboard sections:
//! native and token balances, module inclusion of a node, and the
//! node-safe registry binding. Calls are encoded with the `sol!` types
//! from `stakinghub-core` and sent as plain `eth_call`/`eth_getBalance`
//! requests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use stakinghub_core::decode::{INodeManagementModule, INodeSafeRegistry, IERC20};

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("rpc transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("unexpected rpc response: {0}")]
    Malformed(String),
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// JSON-RPC reader bound to one endpoint.
#[derive(Debug, Clone)]
pub struct ChainClient {
    http: reqwest::Client,
    url: String,
    next_id: Arc<AtomicU64>,
}

impl ChainClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, ChainError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(%method, id, "rpc request");
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response: RpcResponse = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        if let Some(err) = response.error {
            return Err(ChainError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        response
            .result
            .ok_or_else(|| ChainError::Malformed("missing result".to_string()))
    }

    fn parse_quantity(value: &Value) -> Result<U256, ChainError> {
        let s = value
            .as_str()
            .ok_or_else(|| ChainError::Malformed(format!("expected hex string, got {value}")))?;
        U256::from_str_radix(s.trim_start_matches("0x"), 16)
            .map_err(|_| ChainError::Malformed(format!("bad quantity: {s}")))
    }

    async fn eth_call(&self, to: Address, data: Vec<u8>) -> Result<Vec<u8>, ChainError> {
        let result = self
            .request(
                "eth_call",
                json!([{ "to": to.to_string(), "data": format!("0x{}", hex::encode(data)) }, "latest"]),
            )
            .await?;
        let s = result
            .as_str()
            .ok_or_else(|| ChainError::Malformed(format!("expected hex string, got {result}")))?;
        hex::decode(s.trim_start_matches("0x"))
            .map_err(|_| ChainError::Malformed(format!("bad call result: {s}")))
    }

    /// Native balance of an account.
    pub async fn native_balance(&self, account: Address) -> Result<U256, ChainError> {
        let result = self
            .request("eth_getBalance", json!([account.to_string(), "latest"]))
            .await?;
        Self::parse_quantity(&result)
    }

    /// ERC-20 balance of an account.
    pub async fn token_balance(&self, token: Address, account: Address) -> Result<U256, ChainError> {
        let call = IERC20::balanceOfCall { account }.abi_encode();
        let output = self.eth_call(token, call).await?;
        IERC20::balanceOfCall::abi_decode_returns(&output)
            .map_err(|e| ChainError::Malformed(format!("balanceOf return: {e}")))
    }

    /// Whether the management module already includes the node.
    pub async fn node_included_in_module(
        &self,
        module: Address,
        node: Address,
    ) -> Result<bool, ChainError> {
        let call = INodeManagementModule::isNodeCall { nodeAddress: node }.abi_encode();
        let output = self.eth_call(module, call).await?;
        INodeManagementModule::isNodeCall::abi_decode_returns(&output)
            .map_err(|e| ChainError::Malformed(format!("isNode return: {e}")))
    }

    /// Whether the node-safe registry maps the node to the given safe.
    pub async fn node_registered_to_safe(
        &self,
        registry: Address,
        node: Address,
        safe: Address,
    ) -> Result<bool, ChainError> {
        let call = INodeSafeRegistry::nodeToSafeCall { nodeAddress: node }.abi_encode();
        let output = self.eth_call(registry, call).await?;
        let bound = INodeSafeRegistry::nodeToSafeCall::abi_decode_returns(&output)
            .map_err(|e| ChainError::Malformed(format!("nodeToSafe return: {e}")))?;
        Ok(bound == safe)
    }
}
