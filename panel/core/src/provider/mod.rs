//! Wallet Provider Integration
//!
//! Abstracted access to the blockchain provider that authorizes accounts,
//! executes reads and signs transactions.
//!
//! # Available Providers
//!
//! - **JSON-RPC**: node or signing proxy with managed accounts (default)
//!
//! # Usage
//!
//! ```ignore
//! use guardpanel_core::provider::{JsonRpcProvider, WalletProvider};
//!
//! let provider = JsonRpcProvider::new("http://127.0.0.1:8545")?;
//! let accounts = provider.request_accounts().await?;
//! ```

mod json_rpc;
mod traits;

pub use json_rpc::JsonRpcProvider;
pub use traits::{CallRequest, ProviderError, TransactionReceipt, WalletProvider};
