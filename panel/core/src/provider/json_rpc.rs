//! JSON-RPC Provider Implementation
//!
//! Wallet provider backed by an Ethereum JSON-RPC 2.0 endpoint whose accounts
//! are managed by the node or a signing proxy in front of it.
//!
//! # Methods used
//!
//! - `eth_requestAccounts` (falls back to `eth_accounts` on nodes without it)
//! - `eth_call` against the `latest` block
//! - `eth_sendTransaction`, signed by the endpoint
//! - `eth_getTransactionReceipt`, polled until inclusion
//!
//! Failed submissions are never retried.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use alloy_primitives::{Address, Bytes, B256, U256, U64};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::time::MissedTickBehavior;

use super::traits::{CallRequest, ProviderError, TransactionReceipt, WalletProvider};
use crate::config::ProviderConfig;
use crate::interface::decode_revert_string;

/// Error code for a request the user declined
const USER_REJECTED: i64 = 4001;
/// Error code for an unknown method
const METHOD_NOT_FOUND: i64 = -32601;
/// Error code geth-style nodes use for reverts
const EXECUTION_REVERTED: i64 = 3;

/// JSON-RPC wallet provider
pub struct JsonRpcProvider {
    /// Endpoint URL
    url: String,
    /// HTTP client
    http_client: reqwest::Client,
    /// Interval between receipt polls
    poll_interval: Duration,
    /// Maximum time to wait for inclusion
    receipt_timeout: Duration,
    /// Next request id
    next_id: AtomicU64,
}

impl JsonRpcProvider {
    /// Create a provider for an endpoint with default timings
    pub fn new(url: impl Into<String>) -> Result<Self, ProviderError> {
        Self::from_config(&ProviderConfig {
            rpc_url: url.into(),
            ..ProviderConfig::default()
        })
    }

    /// Create from `ProviderConfig`
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        Ok(Self {
            url: config.rpc_url.clone(),
            http_client,
            poll_interval: config.receipt_poll_interval(),
            receipt_timeout: config.receipt_timeout(),
            next_id: AtomicU64::new(1),
        })
    }

    /// Endpoint URL
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send one JSON-RPC request and return its `result`
    async fn request(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, ProviderError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(method, id, "JSON-RPC request");

        let response = self
            .http_client
            .post(&self.url)
            .json(&RpcRequest {
                jsonrpc: "2.0",
                id,
                method,
                params,
            })
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Transport(format!(
                "{} returned {status}: {body}",
                self.url
            )));
        }

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        match body.error {
            Some(error) => {
                tracing::debug!(method, id, code = error.code, "JSON-RPC error");
                Err(map_rpc_error(error))
            }
            None => Ok(body.result),
        }
    }

    fn transport_error(&self, error: &reqwest::Error) -> ProviderError {
        if error.is_connect() {
            ProviderError::Unavailable {
                endpoint: self.url.clone(),
            }
        } else {
            ProviderError::Transport(error.to_string())
        }
    }

    /// Poll for the receipt until it appears; the caller bounds the wait
    async fn poll_receipt(&self, tx_hash: B256) -> Result<TransactionReceipt, ProviderError> {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let value = self
                .request("eth_getTransactionReceipt", serde_json::json!([tx_hash]))
                .await?;
            if value.is_null() {
                tracing::trace!(%tx_hash, "Receipt not available yet");
                continue;
            }
            let receipt: RpcReceipt = decode("eth_getTransactionReceipt", value)?;
            return Ok(receipt.into());
        }
    }
}

#[async_trait]
impl WalletProvider for JsonRpcProvider {
    fn name(&self) -> &'static str {
        "JSON-RPC"
    }

    async fn check_available(&self) -> Result<(), ProviderError> {
        self.request("eth_chainId", serde_json::json!([]))
            .await
            .map(drop)
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        let value = match self
            .request("eth_requestAccounts", serde_json::json!([]))
            .await
        {
            Err(ProviderError::Rpc { code, .. }) if code == METHOD_NOT_FOUND => {
                tracing::debug!("eth_requestAccounts unsupported, using eth_accounts");
                self.request("eth_accounts", serde_json::json!([])).await?
            }
            other => other?,
        };

        let accounts: Vec<Address> = decode("eth_accounts", value)?;
        if accounts.is_empty() {
            return Err(ProviderError::NoAccounts);
        }
        Ok(accounts)
    }

    async fn call(&self, request: &CallRequest) -> Result<Bytes, ProviderError> {
        let value = self
            .request(
                "eth_call",
                serde_json::json!([TransactionObject::from(request), "latest"]),
            )
            .await?;
        decode("eth_call", value)
    }

    async fn send_transaction(&self, request: &CallRequest) -> Result<B256, ProviderError> {
        let value = self
            .request(
                "eth_sendTransaction",
                serde_json::json!([TransactionObject::from(request)]),
            )
            .await?;
        decode("eth_sendTransaction", value)
    }

    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<TransactionReceipt, ProviderError> {
        tokio::time::timeout(self.receipt_timeout, self.poll_receipt(tx_hash))
            .await
            .map_err(|_| ProviderError::Timeout {
                tx_hash,
                waited: self.receipt_timeout,
            })?
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: serde_json::Value,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: serde_json::Value,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct TransactionObject<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<Address>,
    to: Address,
    data: &'a Bytes,
    #[serde(skip_serializing_if = "U256::is_zero")]
    value: U256,
}

impl<'a> From<&'a CallRequest> for TransactionObject<'a> {
    fn from(request: &'a CallRequest) -> Self {
        Self {
            from: request.from,
            to: request.to,
            data: &request.data,
            value: request.value,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    transaction_hash: B256,
    #[serde(default)]
    block_number: Option<U64>,
    #[serde(default)]
    status: Option<U64>,
    #[serde(default)]
    gas_used: Option<U64>,
}

impl From<RpcReceipt> for TransactionReceipt {
    fn from(receipt: RpcReceipt) -> Self {
        Self {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number.map(|n| n.to::<u64>()),
            // Receipts without a status field predate the status code
            success: receipt.status != Some(U64::ZERO),
            gas_used: receipt.gas_used.map(|g| g.to::<u64>()),
        }
    }
}

fn decode<T: DeserializeOwned>(method: &str, value: serde_json::Value) -> Result<T, ProviderError> {
    serde_json::from_value(value)
        .map_err(|e| ProviderError::InvalidResponse(format!("{method}: {e}")))
}

fn map_rpc_error(error: RpcErrorObject) -> ProviderError {
    if error.code == USER_REJECTED {
        return ProviderError::UserRejected(error.message);
    }

    let data = error.data.as_ref().and_then(revert_payload);
    if error.code == EXECUTION_REVERTED
        || data.is_some()
        || error.message.to_lowercase().contains("revert")
    {
        let reason = data
            .as_ref()
            .and_then(|data| decode_revert_string(data))
            .or_else(|| {
                error
                    .message
                    .strip_prefix("execution reverted: ")
                    .map(str::to_string)
            });
        return ProviderError::Reverted {
            reason,
            data,
            message: error.message,
        };
    }

    ProviderError::Rpc {
        code: error.code,
        message: error.message,
    }
}

/// Revert payload from an error's `data`, either a hex string or `{ "data": hex }`
fn revert_payload(data: &serde_json::Value) -> Option<Bytes> {
    let hex = data
        .as_str()
        .or_else(|| data.get("data").and_then(serde_json::Value::as_str))?;
    hex.parse::<Bytes>().ok().filter(|bytes| !bytes.is_empty())
}
