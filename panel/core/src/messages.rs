//! Panel Messages
//!
//! Messages sent from the dispatch core to the presentation layer. These
//! represent every visible effect an action can have: toasts, busy controls,
//! session display, rendered status and cleared inputs.
//!
//! # Design Philosophy
//!
//! The core decides *what* is shown; the presentation layer decides *how*.
//! Controls, inputs and display targets are addressed by stable identifiers so
//! any surface (terminal, web view, test harness) can map them to its widgets.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::status::{AccountStatus, StatusView};

/// Messages from the dispatch core to a presentation surface
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum PanelMessage {
    /// Toast-style notification
    Notify {
        /// Notification level
        level: NotifyLevel,
        /// Message content
        message: String,
    },

    /// A trigger control became busy or idle
    ///
    /// Busy controls must be disabled and show [`Control::BUSY_LABEL`];
    /// idle controls restore their original label.
    ControlBusy {
        /// The control whose state changed
        control: Control,
        /// Whether the control is now busy
        busy: bool,
    },

    /// A wallet session was established (or replaced)
    SessionEstablished {
        /// Authorized account
        account: Address,
        /// Bound contract address
        contract: Address,
        /// Truncated account for display
        account_display: String,
        /// Truncated contract address for display
        contract_display: String,
    },

    /// Freshly fetched account status
    Status {
        /// Decoded status
        status: AccountStatus,
        /// Display strings for each status field
        view: StatusView,
    },

    /// Input elements whose values were consumed and should be emptied
    ClearInputs {
        /// Fields to clear
        fields: Vec<InputField>,
    },

    /// The contract interface description finished loading
    InterfaceReady {
        /// Number of callable functions described
        functions: usize,
    },

    /// The contract interface description could not be loaded
    ///
    /// This is terminal for the lifetime of the panel.
    InterfaceFailed {
        /// Error description
        error: String,
    },
}

/// Notification levels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotifyLevel {
    /// Informational (progress)
    Info,
    /// Operation completed
    Success,
    /// Precondition not met
    Warning,
    /// Operation failed
    Error,
}

impl NotifyLevel {
    /// Short tag for text surfaces
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "ok",
            Self::Warning => "warn",
            Self::Error => "error",
        }
    }
}

/// Trigger controls exposed by the presentation layer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Control {
    /// Connect wallet
    Connect,
    /// Refresh account status
    RefreshStatus,
    /// Deposit funds
    Deposit,
    /// Transfer funds
    Transfer,
    /// Set guardian address
    SetGuardian,
    /// Set high-value threshold
    SetThreshold,
    /// Mark address risky
    MarkRisky,
    /// Mark address trusted
    MarkTrusted,
    /// Toggle safe mode
    ToggleSafeMode,
    /// Owner-initiated freeze
    ManualFreeze,
    /// Guardian-initiated freeze
    GuardianFreeze,
    /// Unfreeze wallet
    Unfreeze,
}

impl Control {
    /// Label shown on a control while its action is in flight
    pub const BUSY_LABEL: &'static str = "Processing...";

    /// Stable element identifier
    #[must_use]
    pub fn element_id(&self) -> &'static str {
        match self {
            Self::Connect => "connectBtn",
            Self::RefreshStatus => "refreshStatusBtn",
            Self::Deposit => "depositBtn",
            Self::Transfer => "transferBtn",
            Self::SetGuardian => "setGuardianBtn",
            Self::SetThreshold => "setThresholdBtn",
            Self::MarkRisky => "setRiskyBtn",
            Self::MarkTrusted => "setTrustedBtn",
            Self::ToggleSafeMode => "toggleSafeModeBtn",
            Self::ManualFreeze => "manualFreezeBtn",
            Self::GuardianFreeze => "guardianFreezeBtn",
            Self::Unfreeze => "unfreezeBtn",
        }
    }
}

impl std::fmt::Display for Control {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.element_id())
    }
}

/// Input elements exposed by the presentation layer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InputField {
    /// Amount to deposit
    DepositAmount,
    /// Transfer recipient
    TransferTo,
    /// Amount to transfer
    TransferAmount,
    /// New guardian
    GuardianAddress,
    /// New high-value threshold
    ThresholdAmount,
    /// Address to mark risky
    RiskyAddress,
    /// Address to mark trusted
    TrustedAddress,
}

impl InputField {
    /// Stable element identifier
    #[must_use]
    pub fn element_id(&self) -> &'static str {
        match self {
            Self::DepositAmount => "depositAmount",
            Self::TransferTo => "transferTo",
            Self::TransferAmount => "transferAmount",
            Self::GuardianAddress => "guardianAddress",
            Self::ThresholdAmount => "thresholdAmount",
            Self::RiskyAddress => "riskyAddress",
            Self::TrustedAddress => "trustedAddress",
        }
    }

    /// Human-readable label used in field-specific errors
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::DepositAmount => "deposit amount",
            Self::TransferTo => "recipient address",
            Self::TransferAmount => "transfer amount",
            Self::GuardianAddress => "guardian address",
            Self::ThresholdAmount => "threshold amount",
            Self::RiskyAddress => "risky address",
            Self::TrustedAddress => "trusted address",
        }
    }
}

/// Session identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// Fresh id, distinct from every other id issued by this process
    pub fn new() -> Self {
        use std::sync::atomic::{AtomicU32, Ordering};
        use std::time::{SystemTime, UNIX_EPOCH};

        static ISSUED: AtomicU32 = AtomicU32::new(1);
        let seq = ISSUED.fetch_add(1, Ordering::Relaxed);
        let epoch_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs());
        Self(format!("conn-{epoch_secs:x}-{seq}"))
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
