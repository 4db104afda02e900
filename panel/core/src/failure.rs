//! Failure Classification
//!
//! Turns a failed contract invocation into the message shown to the user.
//!
//! Classification prefers structured information: a custom error decoded from
//! the revert payload is matched by name before any message text is looked at.
//! Text matching is the fallback for providers that only report strings.

use serde::{Deserialize, Serialize};

use crate::actions::Action;
use crate::contract::ContractError;
use crate::interface::ContractInterface;

/// Shown when an unfreeze is attempted before the timelock has elapsed
pub const TIMELOCK_MESSAGE: &str = "Timelock not over yet!";

const TIMELOCK_MARKER: &str = "timelock";

/// Failure categories with a dedicated user message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// Unfreeze attempted while the timelock is still running
    TimelockActive,
    /// Anything else
    Generic,
}

/// A classified failure
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    /// Category
    pub kind: FailureKind,
    /// User-facing message
    pub message: String,
}

/// Classify the failure of `action`
#[must_use]
pub fn classify_failure(
    action: Action,
    error: &ContractError,
    interface: &ContractInterface,
) -> Failure {
    if action == Action::Unfreeze && is_timelock(error, interface) {
        return Failure {
            kind: FailureKind::TimelockActive,
            message: TIMELOCK_MESSAGE.to_string(),
        };
    }

    let detail = error
        .reason()
        .map_or_else(|| error.to_string(), str::to_string);
    Failure {
        kind: FailureKind::Generic,
        message: format!("{}: {detail}", action.failure_prefix()),
    }
}

fn is_timelock(error: &ContractError, interface: &ContractInterface) -> bool {
    let mentions = |text: &str| text.to_lowercase().contains(TIMELOCK_MARKER);

    if let Some(name) = error.revert_data().and_then(|data| interface.decode_error(data)) {
        return mentions(name);
    }
    error.reason().is_some_and(mentions) || mentions(&error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderError;
    use alloy_primitives::Bytes;

    const ABI: &str = include_str!("../abi.json");

    fn interface() -> ContractInterface {
        ContractInterface::from_json(ABI).expect("bundled ABI")
    }

    fn reverted(reason: Option<&str>, data: Option<Bytes>, message: &str) -> ContractError {
        ContractError::Provider(ProviderError::Reverted {
            reason: reason.map(str::to_string),
            data,
            message: message.to_string(),
        })
    }

    fn selector_of(name: &str) -> Bytes {
        let interface = interface();
        let error = interface
            .abi()
            .errors()
            .find(|e| e.name == name)
            .expect("declared error");
        let mut data = error.selector().to_vec();
        data.extend_from_slice(&[0u8; 32]);
        data.into()
    }

    #[test]
    fn test_timelock_from_custom_error() {
        let error = reverted(None, Some(selector_of("TimelockActive")), "execution reverted");
        let failure = classify_failure(Action::Unfreeze, &error, &interface());
        assert_eq!(failure.kind, FailureKind::TimelockActive);
        assert_eq!(failure.message, TIMELOCK_MESSAGE);
    }

    #[test]
    fn test_other_custom_error_is_generic() {
        // Decoded name wins over message text
        let error = reverted(None, Some(selector_of("NotOwner")), "timelock unrelated");
        let failure = classify_failure(Action::Unfreeze, &error, &interface());
        assert_eq!(failure.kind, FailureKind::Generic);
    }

    #[test]
    fn test_timelock_from_reason_text() {
        let error = reverted(
            Some("Timelock not expired"),
            None,
            "execution reverted: Timelock not expired",
        );
        let failure = classify_failure(Action::Unfreeze, &error, &interface());
        assert_eq!(failure.kind, FailureKind::TimelockActive);
    }

    #[test]
    fn test_timelock_only_for_unfreeze() {
        let error = reverted(Some("Timelock active"), None, "execution reverted");
        let failure = classify_failure(Action::Transfer, &error, &interface());
        assert_eq!(failure.kind, FailureKind::Generic);
        assert_eq!(failure.message, "Transfer failed: Timelock active");
    }

    #[test]
    fn test_generic_uses_reason_then_message() {
        let with_reason = reverted(Some("Not owner"), None, "execution reverted: Not owner");
        assert_eq!(
            classify_failure(Action::Unfreeze, &with_reason, &interface()).message,
            "Unfreeze failed: Not owner"
        );

        let without = ContractError::Provider(ProviderError::UserRejected(
            "User denied transaction signature".to_string(),
        ));
        assert_eq!(
            classify_failure(Action::Deposit, &without, &interface()).message,
            "Deposit failed: User denied transaction signature"
        );
    }

    #[test]
    fn test_time_alone_is_not_timelock() {
        let error = reverted(Some("Request timed out"), None, "execution reverted");
        let failure = classify_failure(Action::Unfreeze, &error, &interface());
        assert_eq!(failure.kind, FailureKind::Generic);
    }
}
