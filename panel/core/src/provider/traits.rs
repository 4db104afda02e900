//! Wallet Provider Traits
//!
//! Trait definitions for the blockchain provider the panel talks to. The
//! dispatcher only needs a handful of operations (authorize, read, submit,
//! await inclusion), so any signing backend exposing them can be plugged in:
//! a node with unlocked accounts, a signing proxy, or a scripted test double.
//!
//! # Design Philosophy
//!
//! The provider owns everything the panel deliberately does not: key
//! management, gas estimation, nonce handling and network retry policy.
//! Implementations report failures as [`ProviderError`], keeping the
//! provider's own reason text so it can be shown to the user verbatim.

use std::time::Duration;

use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use thiserror::Error;

/// A call or transaction against a contract
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallRequest {
    /// Sender (signing identity)
    pub from: Option<Address>,
    /// Contract address
    pub to: Address,
    /// Selector-prefixed calldata
    pub data: Bytes,
    /// Native value attached, in base units
    pub value: U256,
}

impl CallRequest {
    /// Create a request with no sender and no value
    pub fn new(to: Address, data: impl Into<Bytes>) -> Self {
        Self {
            from: None,
            to,
            data: data.into(),
            value: U256::ZERO,
        }
    }

    /// Set the sender
    #[must_use]
    pub fn with_from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    /// Attach native value
    #[must_use]
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }
}

/// Inclusion result of a submitted transaction
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionReceipt {
    /// Transaction hash
    pub tx_hash: B256,
    /// Block the transaction was included in
    pub block_number: Option<u64>,
    /// Whether execution succeeded
    pub success: bool,
    /// Gas consumed (if reported)
    pub gas_used: Option<u64>,
}

/// Errors reported by a wallet provider
#[derive(Clone, Debug, Error)]
pub enum ProviderError {
    /// No provider is reachable in this environment
    #[error("No wallet provider available at {endpoint}. Start a node or signer there, or pass --rpc-url.")]
    Unavailable {
        /// Endpoint that was tried
        endpoint: String,
    },

    /// The user declined the request
    #[error("{0}")]
    UserRejected(String),

    /// Authorization succeeded but yielded no account
    #[error("Wallet provider returned no accounts")]
    NoAccounts,

    /// Execution reverted
    #[error("{message}")]
    Reverted {
        /// Decoded revert reason, if any
        reason: Option<String>,
        /// Raw revert payload, if any
        data: Option<Bytes>,
        /// Provider message
        message: String,
    },

    /// JSON-RPC error object
    #[error("{message} (code {code})")]
    Rpc {
        /// Error code
        code: i64,
        /// Error message
        message: String,
    },

    /// Network failure talking to the provider
    #[error("Transport error: {0}")]
    Transport(String),

    /// The provider answered with something unexpected
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    /// Transaction was included but execution failed
    #[error("Transaction {tx_hash} failed on-chain")]
    TransactionFailed {
        /// Transaction hash
        tx_hash: B256,
    },

    /// Transaction was not included in time
    #[error("Transaction {tx_hash} not included after {}s", .waited.as_secs())]
    Timeout {
        /// Transaction hash
        tx_hash: B256,
        /// How long inclusion was awaited
        waited: Duration,
    },
}

impl ProviderError {
    /// Provider-supplied revert reason, if any
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Reverted {
                reason: Some(reason),
                ..
            } => Some(reason),
            _ => None,
        }
    }

    /// Raw revert payload, if any
    #[must_use]
    pub fn revert_data(&self) -> Option<&[u8]> {
        match self {
            Self::Reverted { data: Some(data), .. } => Some(data),
            _ => None,
        }
    }
}

/// Wallet provider trait
///
/// Implement this trait to drive the panel through a different signing backend.
#[async_trait]
pub trait WalletProvider: Send + Sync + 'static {
    /// Provider name for logs
    fn name(&self) -> &str;

    /// Check that a provider answers
    ///
    /// [`ProviderError::Unavailable`] means nothing is there; any other error
    /// comes from a provider that is present but failing.
    async fn check_available(&self) -> Result<(), ProviderError>;

    /// Request authorization and return the authorized accounts
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError>;

    /// Execute a read-only call and return its raw result
    async fn call(&self, request: &CallRequest) -> Result<Bytes, ProviderError>;

    /// Sign and submit a transaction, returning its hash
    async fn send_transaction(&self, request: &CallRequest) -> Result<B256, ProviderError>;

    /// Wait until a submitted transaction is included
    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<TransactionReceipt, ProviderError>;
}
