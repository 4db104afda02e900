//! Bound Contract Handle
//!
//! A contract address bound to its interface description, a provider and a
//! signing identity. Reads go through `eth_call`; writes are submitted and
//! return a [`PendingTransaction`] that resolves on inclusion.

use std::sync::Arc;

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, B256, U256};
use thiserror::Error;

use crate::interface::{ContractInterface, InterfaceError};
use crate::provider::{CallRequest, ProviderError, TransactionReceipt, WalletProvider};

/// Errors from a contract read or write
#[derive(Debug, Error)]
pub enum ContractError {
    /// Encoding or decoding against the interface description failed
    #[error(transparent)]
    Interface(#[from] InterfaceError),

    /// The provider reported a failure
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl ContractError {
    /// Provider-supplied revert reason, if any
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Provider(e) => e.reason(),
            Self::Interface(_) => None,
        }
    }

    /// Raw revert payload, if any
    #[must_use]
    pub fn revert_data(&self) -> Option<&[u8]> {
        match self {
            Self::Provider(e) => e.revert_data(),
            Self::Interface(_) => None,
        }
    }
}

/// One contract method invocation
#[derive(Clone, Debug, PartialEq)]
pub struct ContractCall {
    /// Method name
    pub method: &'static str,
    /// ABI arguments
    pub args: Vec<DynSolValue>,
    /// Native value attached, in base units
    pub value: U256,
}

impl ContractCall {
    /// Create a call with no attached value
    #[must_use]
    pub fn new(method: &'static str, args: Vec<DynSolValue>) -> Self {
        Self {
            method,
            args,
            value: U256::ZERO,
        }
    }

    /// Attach native value
    #[must_use]
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }
}

/// Contract bound to an interface, provider and signer
pub struct ContractHandle<P> {
    address: Address,
    signer: Address,
    interface: Arc<ContractInterface>,
    provider: Arc<P>,
}

impl<P> Clone for ContractHandle<P> {
    fn clone(&self) -> Self {
        Self {
            address: self.address,
            signer: self.signer,
            interface: Arc::clone(&self.interface),
            provider: Arc::clone(&self.provider),
        }
    }
}

impl<P> std::fmt::Debug for ContractHandle<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractHandle")
            .field("address", &self.address)
            .field("signer", &self.signer)
            .finish_non_exhaustive()
    }
}

impl<P: WalletProvider> ContractHandle<P> {
    /// Bind a contract address
    pub fn new(
        address: Address,
        signer: Address,
        interface: Arc<ContractInterface>,
        provider: Arc<P>,
    ) -> Self {
        Self {
            address,
            signer,
            interface,
            provider,
        }
    }

    /// Contract address
    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    /// Signing identity
    #[must_use]
    pub fn signer(&self) -> Address {
        self.signer
    }

    /// Interface description
    #[must_use]
    pub fn interface(&self) -> &ContractInterface {
        &self.interface
    }

    /// Invoke a read-only method and decode its outputs
    pub async fn read(
        &self,
        method: &str,
        args: &[DynSolValue],
    ) -> Result<Vec<DynSolValue>, ContractError> {
        let data = self.interface.encode_call(method, args)?;
        tracing::debug!(contract = %self.address, method, "Contract read");

        let request = CallRequest::new(self.address, data).with_from(self.signer);
        let output = self.provider.call(&request).await?;
        Ok(self.interface.decode_output(method, args.len(), &output)?)
    }

    /// Submit a state-changing call
    pub async fn submit(&self, call: &ContractCall) -> Result<PendingTransaction<P>, ContractError> {
        let data = self.interface.encode_call(call.method, &call.args)?;
        tracing::debug!(
            contract = %self.address,
            method = call.method,
            value = %call.value,
            "Contract write"
        );

        let request = CallRequest::new(self.address, data)
            .with_from(self.signer)
            .with_value(call.value);
        let tx_hash = self.provider.send_transaction(&request).await?;

        Ok(PendingTransaction {
            tx_hash,
            provider: Arc::clone(&self.provider),
        })
    }
}

/// A submitted transaction awaiting inclusion
pub struct PendingTransaction<P> {
    tx_hash: B256,
    provider: Arc<P>,
}

impl<P: WalletProvider> PendingTransaction<P> {
    /// Transaction hash
    #[must_use]
    pub fn tx_hash(&self) -> B256 {
        self.tx_hash
    }

    /// Wait for inclusion; an included but failed transaction is an error
    pub async fn wait(self) -> Result<TransactionReceipt, ContractError> {
        let receipt = self.provider.wait_for_receipt(self.tx_hash).await?;
        if !receipt.success {
            return Err(ProviderError::TransactionFailed {
                tx_hash: self.tx_hash,
            }
            .into());
        }

        tracing::info!(
            tx_hash = %self.tx_hash,
            block = ?receipt.block_number,
            "Transaction included"
        );
        Ok(receipt)
    }
}
