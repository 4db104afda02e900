//! Wallet Session
//!
//! The authorized binding between a signing identity and the target contract.
//!
//! # Design Philosophy
//!
//! There is no global session. [`crate::Dispatcher::connect`] returns a
//! `Session` value and callers hold and pass it explicitly; an action runs
//! against the session it was handed, so reconnecting while the action is in
//! flight cannot change what it talks to.

use alloy_primitives::Address;

use crate::contract::ContractHandle;
use crate::messages::SessionId;
use crate::validation::truncate_address;

/// An established wallet session
pub struct Session<P> {
    /// Unique session ID (log correlation only)
    pub id: SessionId,
    /// Authorized account
    pub account: Address,
    /// Contract bound to the account
    pub contract: ContractHandle<P>,
}

impl<P> Session<P> {
    /// Create a session for an authorized account
    pub fn new(account: Address, contract: ContractHandle<P>) -> Self {
        Self {
            id: SessionId::new(),
            account,
            contract,
        }
    }

    /// Truncated account for display
    #[must_use]
    pub fn account_display(&self) -> String {
        truncate_address(&self.account)
    }
}

// Manual impl: cloning shares the provider, so `P` itself need not be `Clone`
impl<P> Clone for Session<P> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            account: self.account,
            contract: self.contract.clone(),
        }
    }
}

impl<P> std::fmt::Debug for Session<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("account", &self.account)
            .field("contract", &self.contract)
            .finish()
    }
}
