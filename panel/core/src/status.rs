//! Account Status
//!
//! Read-only projection of the contract's state for the connected account,
//! decoded from the positional tuple returned by `getStatus()`.
//!
//! The status is never cached by the core: it is fetched on demand and after
//! every status-relevant action, then handed to the presentation layer.

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validation::{format_base_units, truncate_address, DISPLAY_DECIMALS};

/// Read-only status query on the contract
pub const STATUS_METHOD: &str = "getStatus";

// Positions in the `getStatus()` return tuple. Position 2 is defined by the
// contract but not surfaced.
const FROZEN: usize = 0;
const BALANCE: usize = 1;
const SAFE_MODE: usize = 3;
const OWNER: usize = 4;
const GUARDIAN: usize = 5;
const MIN_FIELDS: usize = 6;

/// The status tuple did not have the expected shape
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StatusDecodeError {
    /// Fewer fields than expected
    #[error("Status tuple has {found} field(s), expected at least {MIN_FIELDS}")]
    TooShort {
        /// Number of fields returned
        found: usize,
    },

    /// A field had an unexpected type
    #[error("Status field {position} is not a {expected}")]
    WrongType {
        /// Tuple position
        position: usize,
        /// Expected Solidity type
        expected: &'static str,
    },
}

/// Decoded account status
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountStatus {
    /// Wallet is frozen
    pub frozen: bool,
    /// Balance in base units
    pub balance: U256,
    /// Safe mode is enabled
    pub safe_mode_enabled: bool,
    /// Wallet owner
    pub owner: Address,
    /// Guardian, `None` when the contract reports the zero address
    pub guardian: Option<Address>,
}

impl AccountStatus {
    /// Decode from the positional `getStatus()` tuple
    pub fn from_tuple(values: &[DynSolValue]) -> Result<Self, StatusDecodeError> {
        if values.len() < MIN_FIELDS {
            return Err(StatusDecodeError::TooShort {
                found: values.len(),
            });
        }

        let guardian = address_at(values, GUARDIAN)?;
        Ok(Self {
            frozen: bool_at(values, FROZEN)?,
            balance: uint_at(values, BALANCE)?,
            safe_mode_enabled: bool_at(values, SAFE_MODE)?,
            owner: address_at(values, OWNER)?,
            guardian: (!guardian.is_zero()).then_some(guardian),
        })
    }
}

fn bool_at(values: &[DynSolValue], position: usize) -> Result<bool, StatusDecodeError> {
    values[position]
        .as_bool()
        .ok_or(StatusDecodeError::WrongType {
            position,
            expected: "bool",
        })
}

fn uint_at(values: &[DynSolValue], position: usize) -> Result<U256, StatusDecodeError> {
    values[position]
        .as_uint()
        .map(|(value, _bits)| value)
        .ok_or(StatusDecodeError::WrongType {
            position,
            expected: "uint",
        })
}

fn address_at(values: &[DynSolValue], position: usize) -> Result<Address, StatusDecodeError> {
    values[position]
        .as_address()
        .ok_or(StatusDecodeError::WrongType {
            position,
            expected: "address",
        })
}

/// Display strings for each status field
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusView {
    /// Truncated owner address
    pub owner: String,
    /// Balance with four decimals and currency symbol
    pub balance: String,
    /// "Yes" / "No"
    pub frozen: String,
    /// Truncated guardian or "Not Set"
    pub guardian: String,
    /// "Enabled" / "Disabled"
    pub safe_mode: String,
}

impl StatusView {
    /// Render a status for display
    #[must_use]
    pub fn render(status: &AccountStatus, currency_symbol: &str) -> Self {
        Self {
            owner: truncate_address(&status.owner),
            balance: format!(
                "{} {currency_symbol}",
                format_base_units(status.balance, DISPLAY_DECIMALS)
            ),
            frozen: if status.frozen { "Yes" } else { "No" }.to_string(),
            guardian: status
                .guardian
                .as_ref()
                .map_or_else(|| "Not Set".to_string(), truncate_address),
            safe_mode: if status.safe_mode_enabled {
                "Enabled"
            } else {
                "Disabled"
            }
            .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tuple(balance: u128, guardian: Address) -> Vec<DynSolValue> {
        vec![
            DynSolValue::Bool(true),
            DynSolValue::Uint(U256::from(balance), 256),
            DynSolValue::Uint(U256::from(12345u64), 256),
            DynSolValue::Bool(false),
            DynSolValue::Address(Address::repeat_byte(0xab)),
            DynSolValue::Address(guardian),
        ]
    }

    #[test]
    fn test_decode_positions() {
        let status = AccountStatus::from_tuple(&tuple(
            2_500_000_000_000_000_000,
            Address::repeat_byte(0x11),
        ))
        .expect("decodes");

        assert!(status.frozen);
        assert_eq!(status.balance, U256::from(2_500_000_000_000_000_000u128));
        assert!(!status.safe_mode_enabled);
        assert_eq!(status.owner, Address::repeat_byte(0xab));
        assert_eq!(status.guardian, Some(Address::repeat_byte(0x11)));
    }

    #[test]
    fn test_zero_guardian_is_none() {
        let status = AccountStatus::from_tuple(&tuple(0, Address::ZERO)).expect("decodes");
        assert_eq!(status.guardian, None);
    }

    #[test]
    fn test_short_tuple_rejected() {
        let values = vec![DynSolValue::Bool(false)];
        assert_eq!(
            AccountStatus::from_tuple(&values),
            Err(StatusDecodeError::TooShort { found: 1 })
        );
    }

    #[test]
    fn test_wrong_type_rejected() {
        let mut values = tuple(0, Address::ZERO);
        values[SAFE_MODE] = DynSolValue::Uint(U256::from(1u64), 256);
        assert_eq!(
            AccountStatus::from_tuple(&values),
            Err(StatusDecodeError::WrongType {
                position: SAFE_MODE,
                expected: "bool"
            })
        );
    }

    #[test]
    fn test_render() {
        let status = AccountStatus::from_tuple(&tuple(2_500_000_000_000_000_000, Address::ZERO))
            .expect("decodes");
        let view = StatusView::render(&status, "C2FLR");

        assert_eq!(
            view,
            StatusView {
                owner: truncate_address(&Address::repeat_byte(0xab)),
                balance: "2.5000 C2FLR".to_string(),
                frozen: "Yes".to_string(),
                guardian: "Not Set".to_string(),
                safe_mode: "Disabled".to_string(),
            }
        );
    }
}
