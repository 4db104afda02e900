//! Input Validation
//!
//! Validation and unit conversion for values typed into the panel's input
//! elements. Validation happens before any busy state or contract call, so a
//! rejected field never produces a partial invocation.
//!
//! # Rules
//!
//! | Field kind | Rule |
//! |---|---|
//! | Address | optional `0x`, 40 hex digits, EIP-55 checksum when mixed case, not zero |
//! | Positive amount | plain decimal, at most 18 fractional digits, `> 0` |
//! | Non-negative amount | plain decimal, at most 18 fractional digits, `>= 0` |

use std::str::FromStr;

use alloy_primitives::utils::parse_ether;
use alloy_primitives::{Address, U256};
use thiserror::Error;

use crate::messages::InputField;

/// Decimals between human-denominated amounts and on-chain base units
pub const BASE_UNIT_DECIMALS: usize = 18;

/// Decimal places used when rendering balances
pub const DISPLAY_DECIMALS: usize = 4;

/// How an input field is validated
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// Non-zero account address
    Address,
    /// Amount strictly greater than zero
    PositiveAmount,
    /// Amount greater than or equal to zero
    NonNegativeAmount,
}

/// A field failed validation
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Not a well-formed address
    #[error("Invalid {}.", .field.label())]
    InvalidAddress {
        /// Offending field
        field: InputField,
    },

    /// Well-formed but zero address
    #[error("The zero address is not allowed as {}.", .field.label())]
    ZeroAddress {
        /// Offending field
        field: InputField,
    },

    /// Empty, non-numeric or out-of-range amount
    #[error("Invalid {}.", .field.label())]
    InvalidAmount {
        /// Offending field
        field: InputField,
    },
}

impl ValidationError {
    /// The field that failed
    #[must_use]
    pub fn field(&self) -> InputField {
        match self {
            Self::InvalidAddress { field }
            | Self::ZeroAddress { field }
            | Self::InvalidAmount { field } => *field,
        }
    }
}

/// A validated amount
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Amount {
    /// The amount as the user typed it (trimmed)
    pub display: String,
    /// The amount scaled to on-chain base units
    pub base_units: U256,
}

/// Check whether a string is an acceptable address
#[must_use]
pub fn is_address(raw: &str) -> bool {
    parse_address_format(raw).is_some()
}

/// Parse an address input, rejecting malformed and zero addresses
pub fn parse_address(raw: &str, field: InputField) -> Result<Address, ValidationError> {
    let address = parse_address_format(raw).ok_or(ValidationError::InvalidAddress { field })?;
    if address.is_zero() {
        return Err(ValidationError::ZeroAddress { field });
    }
    Ok(address)
}

fn parse_address_format(raw: &str) -> Option<Address> {
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    if digits.len() != 40 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let address = Address::from_str(digits).ok()?;

    // Single-case input carries no checksum; mixed case must match EIP-55
    let has_upper = digits.bytes().any(|b| b.is_ascii_uppercase());
    let has_lower = digits.bytes().any(|b| b.is_ascii_lowercase());
    if has_upper && has_lower {
        let checksummed = address.to_checksum(None);
        if &checksummed[2..] != digits {
            return None;
        }
    }

    Some(address)
}

/// Parse an amount input of the given kind into base units
///
/// `kind` must be one of the amount kinds; [`FieldKind::Address`] is treated
/// as non-negative.
pub fn parse_amount(
    raw: &str,
    field: InputField,
    kind: FieldKind,
) -> Result<Amount, ValidationError> {
    let invalid = || ValidationError::InvalidAmount { field };

    let normalized = normalize_decimal(raw).ok_or_else(invalid)?;
    let base_units = parse_ether(&normalized).map_err(|_| invalid())?;

    if kind == FieldKind::PositiveAmount && base_units.is_zero() {
        return Err(invalid());
    }

    Ok(Amount {
        display: raw.to_string(),
        base_units,
    })
}

/// Reduce `.5` / `5.` forms to something the unit parser accepts
fn normalize_decimal(raw: &str) -> Option<String> {
    let (int_part, frac_part) = match raw.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (raw, ""),
    };

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty())
        || !all_digits(int_part)
        || !all_digits(frac_part)
        || frac_part.len() > BASE_UNIT_DECIMALS
    {
        return None;
    }

    let int_part = if int_part.is_empty() { "0" } else { int_part };
    if frac_part.is_empty() {
        Some(int_part.to_string())
    } else {
        Some(format!("{int_part}.{frac_part}"))
    }
}

/// Render a base-unit value as a decimal with `places` fractional digits
///
/// Rounds half up. `places` above 18 is clamped to 18.
#[must_use]
pub fn format_base_units(value: U256, places: usize) -> String {
    let places = places.min(BASE_UNIT_DECIMALS);
    let ten = U256::from(10u64);
    let dropped = ten.pow(U256::from(BASE_UNIT_DECIMALS - places));
    let half = dropped / U256::from(2u64);
    let mut scaled = value / dropped;
    if !half.is_zero() && value % dropped >= half {
        scaled += U256::from(1u64);
    }

    if places == 0 {
        return scaled.to_string();
    }

    let unit = ten.pow(U256::from(places));
    let whole = scaled / unit;
    let frac = (scaled % unit).to_string();
    format!("{whole}.{frac:0>places$}")
}

/// Shorten an address to `0xAbCd...1234` using its checksum form
#[must_use]
pub fn truncate_address(address: &Address) -> String {
    let full = address.to_checksum(None);
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}
