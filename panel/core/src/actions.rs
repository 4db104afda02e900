//! Mutating Actions
//!
//! Every mutating action the panel exposes, described as data: which control
//! triggers it, which input fields it reads and how they are validated, which
//! contract method it invokes, and the texts reported while it runs.
//!
//! The dispatcher treats all actions uniformly; anything action-specific lives
//! in the tables below.

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::contract::ContractCall;
use crate::events::FormInputs;
use crate::messages::{Control, InputField};
use crate::validation::{parse_address, parse_amount, Amount, FieldKind, ValidationError};

/// A declared input field and its validation rule
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    /// Input element read
    pub field: InputField,
    /// Validation rule
    pub kind: FieldKind,
}

const fn spec(field: InputField, kind: FieldKind) -> FieldSpec {
    FieldSpec { field, kind }
}

const DEPOSIT_FIELDS: &[FieldSpec] = &[spec(InputField::DepositAmount, FieldKind::PositiveAmount)];
const TRANSFER_FIELDS: &[FieldSpec] = &[
    spec(InputField::TransferTo, FieldKind::Address),
    spec(InputField::TransferAmount, FieldKind::PositiveAmount),
];
const GUARDIAN_FIELDS: &[FieldSpec] = &[spec(InputField::GuardianAddress, FieldKind::Address)];
const THRESHOLD_FIELDS: &[FieldSpec] =
    &[spec(InputField::ThresholdAmount, FieldKind::NonNegativeAmount)];
const RISKY_FIELDS: &[FieldSpec] = &[spec(InputField::RiskyAddress, FieldKind::Address)];
const TRUSTED_FIELDS: &[FieldSpec] = &[spec(InputField::TrustedAddress, FieldKind::Address)];

/// Mutating actions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Deposit native currency into the wallet
    Deposit,
    /// Transfer funds to a recipient
    Transfer,
    /// Set the guardian address
    SetGuardian,
    /// Set the high-value threshold
    SetThreshold,
    /// Mark an address as risky
    MarkRisky,
    /// Mark an address as trusted
    MarkTrusted,
    /// Toggle safe mode
    ToggleSafeMode,
    /// Owner-initiated freeze
    ManualFreeze,
    /// Guardian-initiated freeze
    GuardianFreeze,
    /// Unfreeze the wallet
    Unfreeze,
}

impl Action {
    /// Every action, in panel order
    pub const ALL: [Action; 10] = [
        Self::Deposit,
        Self::Transfer,
        Self::SetGuardian,
        Self::SetThreshold,
        Self::MarkRisky,
        Self::MarkTrusted,
        Self::ToggleSafeMode,
        Self::ManualFreeze,
        Self::GuardianFreeze,
        Self::Unfreeze,
    ];

    /// Trigger control
    #[must_use]
    pub fn control(self) -> Control {
        match self {
            Self::Deposit => Control::Deposit,
            Self::Transfer => Control::Transfer,
            Self::SetGuardian => Control::SetGuardian,
            Self::SetThreshold => Control::SetThreshold,
            Self::MarkRisky => Control::MarkRisky,
            Self::MarkTrusted => Control::MarkTrusted,
            Self::ToggleSafeMode => Control::ToggleSafeMode,
            Self::ManualFreeze => Control::ManualFreeze,
            Self::GuardianFreeze => Control::GuardianFreeze,
            Self::Unfreeze => Control::Unfreeze,
        }
    }

    /// Contract method invoked
    #[must_use]
    pub fn method(self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Transfer => "transfer",
            Self::SetGuardian => "setGuardian",
            Self::SetThreshold => "setHighValueThreshold",
            Self::MarkRisky => "setRiskyAddress",
            Self::MarkTrusted => "setTrustedAddress",
            Self::ToggleSafeMode => "toggleSafeMode",
            Self::ManualFreeze => "manualFreeze",
            Self::GuardianFreeze => "guardianFreeze",
            Self::Unfreeze => "unfreeze",
        }
    }

    /// Declared input fields, in validation order
    #[must_use]
    pub fn fields(self) -> &'static [FieldSpec] {
        match self {
            Self::Deposit => DEPOSIT_FIELDS,
            Self::Transfer => TRANSFER_FIELDS,
            Self::SetGuardian => GUARDIAN_FIELDS,
            Self::SetThreshold => THRESHOLD_FIELDS,
            Self::MarkRisky => RISKY_FIELDS,
            Self::MarkTrusted => TRUSTED_FIELDS,
            Self::ToggleSafeMode | Self::ManualFreeze | Self::GuardianFreeze | Self::Unfreeze => {
                &[]
            }
        }
    }

    /// Whether a successful invocation changes what the status view shows
    #[must_use]
    pub fn refreshes_status(self) -> bool {
        !matches!(
            self,
            Self::SetThreshold | Self::MarkRisky | Self::MarkTrusted
        )
    }

    /// Kebab-case command name (`set-guardian`)
    #[must_use]
    pub fn command_name(self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Transfer => "transfer",
            Self::SetGuardian => "set-guardian",
            Self::SetThreshold => "set-threshold",
            Self::MarkRisky => "mark-risky",
            Self::MarkTrusted => "mark-trusted",
            Self::ToggleSafeMode => "toggle-safe-mode",
            Self::ManualFreeze => "manual-freeze",
            Self::GuardianFreeze => "guardian-freeze",
            Self::Unfreeze => "unfreeze",
        }
    }

    /// Look up an action by its command name
    #[must_use]
    pub fn from_command_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.command_name() == name)
    }

    /// Validate the declared fields in order, stopping at the first failure
    pub fn validate(self, inputs: &FormInputs) -> Result<ValidatedInputs, ValidationError> {
        let mut values = Vec::with_capacity(self.fields().len());
        for spec in self.fields() {
            let raw = inputs.read(spec.field);
            let value = match spec.kind {
                FieldKind::Address => ValidatedValue::Address(parse_address(raw, spec.field)?),
                FieldKind::PositiveAmount | FieldKind::NonNegativeAmount => {
                    ValidatedValue::Amount(parse_amount(raw, spec.field, spec.kind)?)
                }
            };
            values.push((spec.field, value));
        }
        Ok(ValidatedInputs { values })
    }

    /// Build the contract invocation for validated inputs
    #[must_use]
    pub fn build_call(self, inputs: &ValidatedInputs) -> ContractCall {
        let method = self.method();
        match self {
            Self::Deposit => ContractCall::new(method, Vec::new()).with_value(
                inputs
                    .first_amount()
                    .map_or(U256::ZERO, |amount| amount.base_units),
            ),
            Self::MarkRisky | Self::MarkTrusted => {
                let mut args = inputs.abi_values();
                args.push(DynSolValue::Bool(true));
                ContractCall::new(method, args)
            }
            Self::ToggleSafeMode => ContractCall::new(method, vec![DynSolValue::Bool(true)]),
            _ => ContractCall::new(method, inputs.abi_values()),
        }
    }

    /// Message reported while the action is in flight
    #[must_use]
    pub fn pending_message(self, inputs: &ValidatedInputs, symbol: &str) -> String {
        let amount = inputs.amount_display();
        match self {
            Self::Deposit => format!("Processing deposit of {amount} {symbol}..."),
            Self::Transfer => format!("Processing transfer of {amount} {symbol}..."),
            Self::SetGuardian => "Setting guardian address...".to_string(),
            Self::SetThreshold => format!("Setting high-value threshold to {amount} {symbol}..."),
            Self::MarkRisky => "Marking address as risky...".to_string(),
            Self::MarkTrusted => "Adding trusted address...".to_string(),
            Self::ToggleSafeMode => "Toggling safe mode...".to_string(),
            Self::ManualFreeze => "Activating manual freeze...".to_string(),
            Self::GuardianFreeze => "Activating guardian freeze...".to_string(),
            Self::Unfreeze => "Attempting to unfreeze wallet...".to_string(),
        }
    }

    /// Message reported once the transaction is included
    #[must_use]
    pub fn success_message(self, inputs: &ValidatedInputs, symbol: &str) -> String {
        let amount = inputs.amount_display();
        match self {
            Self::Deposit => format!("Deposit of {amount} {symbol} successful!"),
            Self::Transfer => format!("Transfer of {amount} {symbol} completed!"),
            Self::SetGuardian => "Guardian set successfully!".to_string(),
            Self::SetThreshold => format!("High-value threshold set to {amount} {symbol}!"),
            Self::MarkRisky => "Address marked as risky!".to_string(),
            Self::MarkTrusted => "Trusted address added!".to_string(),
            Self::ToggleSafeMode => "Safe mode toggled!".to_string(),
            Self::ManualFreeze => "Manual freeze activated!".to_string(),
            Self::GuardianFreeze => "Guardian freeze activated!".to_string(),
            Self::Unfreeze => "Wallet unfrozen successfully!".to_string(),
        }
    }

    /// Prefix of the generic failure message
    #[must_use]
    pub fn failure_prefix(self) -> &'static str {
        match self {
            Self::Deposit => "Deposit failed",
            Self::Transfer => "Transfer failed",
            Self::SetGuardian => "Failed to set guardian",
            Self::SetThreshold => "Failed to set threshold",
            Self::MarkRisky => "Failed to mark risky",
            Self::MarkTrusted => "Failed to add trusted address",
            Self::ToggleSafeMode => "Failed to toggle safe mode",
            Self::ManualFreeze => "Manual freeze failed",
            Self::GuardianFreeze => "Guardian freeze failed",
            Self::Unfreeze => "Unfreeze failed",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.command_name())
    }
}

/// A single validated field value
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidatedValue {
    /// Non-zero address
    Address(Address),
    /// Amount in base units
    Amount(Amount),
}

impl ValidatedValue {
    fn to_abi(&self) -> DynSolValue {
        match self {
            Self::Address(address) => DynSolValue::Address(*address),
            Self::Amount(amount) => DynSolValue::Uint(amount.base_units, 256),
        }
    }
}

/// Declared fields of one invocation, validated, in declaration order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidatedInputs {
    values: Vec<(InputField, ValidatedValue)>,
}

impl ValidatedInputs {
    /// Fields consumed by the invocation
    #[must_use]
    pub fn fields(&self) -> Vec<InputField> {
        self.values.iter().map(|(field, _)| *field).collect()
    }

    /// Validated value of a field
    #[must_use]
    pub fn get(&self, field: InputField) -> Option<&ValidatedValue> {
        self.values
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, value)| value)
    }

    fn first_amount(&self) -> Option<&Amount> {
        self.values.iter().find_map(|(_, value)| match value {
            ValidatedValue::Amount(amount) => Some(amount),
            ValidatedValue::Address(_) => None,
        })
    }

    fn amount_display(&self) -> &str {
        self.first_amount().map_or("", |amount| amount.display.as_str())
    }

    fn abi_values(&self) -> Vec<DynSolValue> {
        self.values.iter().map(|(_, value)| value.to_abi()).collect()
    }
}
