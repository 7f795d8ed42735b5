//! Error taxonomy shared by every wallet adapter.
//!
//! Application code sees exactly one of these kinds per failed operation,
//! whichever provider and variant produced it. Bridge and host failures are
//! remapped here and never cross the facade raw.

use bridge_traits::BridgeError;
use core_invoke::{FailureKind, InvokeError};
use thiserror::Error;

use crate::types::ProviderIdentity;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("{provider} is not available in this build or on this device")]
    CapabilityUnavailable { provider: ProviderIdentity },

    #[error("{provider} adapter is not initialized: {reason}")]
    NotInitialized {
        provider: ProviderIdentity,
        reason: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Operation canceled by the user")]
    UserCanceled,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No active wallet on this device")]
    NoActiveWallet,

    #[error("Provider error{}: {reason}", status.map(|s| format!(" (status {s})")).unwrap_or_default())]
    ProviderError { status: Option<i32>, reason: String },
}

impl WalletError {
    pub fn provider_error(status: Option<i32>, reason: impl Into<String>) -> Self {
        WalletError::ProviderError {
            status,
            reason: reason.into(),
        }
    }

    pub fn not_initialized(provider: ProviderIdentity, reason: impl Into<String>) -> Self {
        WalletError::NotInitialized {
            provider,
            reason: reason.into(),
        }
    }

    /// Stable code handed to the application layer alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            WalletError::CapabilityUnavailable { .. } => "CAPABILITY_UNAVAILABLE",
            WalletError::NotInitialized { .. } => "NOT_INITIALIZED",
            WalletError::InvalidInput(_) => "INVALID_INPUT",
            WalletError::UserCanceled => "USER_CANCELED",
            WalletError::NotFound(_) => "NOT_FOUND",
            WalletError::NoActiveWallet => "NO_ACTIVE_WALLET",
            WalletError::ProviderError { .. } => "PROVIDER_ERROR",
        }
    }

    /// Remap a bridge failure at the adapter boundary.
    ///
    /// An absent capability or a missing class means the SDK is not really
    /// there; any other unresolved target is an SDK/API mismatch and is
    /// reported as a provider error together with whatever the native code
    /// raised.
    pub fn from_invoke(provider: ProviderIdentity, err: InvokeError) -> Self {
        match (&err, err.kind()) {
            (_, FailureKind::CapabilityAbsent) | (InvokeError::ClassNotFound(_), _) => {
                WalletError::CapabilityUnavailable { provider }
            }
            _ => WalletError::ProviderError {
                status: err.native_status(),
                reason: err.to_string(),
            },
        }
    }
}

impl WalletError {
    /// Remap a host container failure raised while launching a flow.
    pub fn from_host(provider: ProviderIdentity, err: BridgeError) -> Self {
        match err {
            BridgeError::HostDetached(reason) => WalletError::NotInitialized { provider, reason },
            other => other.into(),
        }
    }
}

impl From<BridgeError> for WalletError {
    fn from(err: BridgeError) -> Self {
        WalletError::ProviderError {
            status: None,
            reason: format!("Host bridge failure: {err}"),
        }
    }
}

pub type Result<T> = std::result::Result<T, WalletError>;

#[cfg(test)]
mod tests {
    use super::*;
    use core_invoke::NativeFault;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(WalletError::UserCanceled.code(), "USER_CANCELED");
        assert_eq!(WalletError::NoActiveWallet.code(), "NO_ACTIVE_WALLET");
        assert_eq!(
            WalletError::CapabilityUnavailable {
                provider: ProviderIdentity::SamsungPay
            }
            .code(),
            "CAPABILITY_UNAVAILABLE"
        );
    }

    #[test]
    fn test_provider_error_display() {
        let err = WalletError::provider_error(Some(15005), "attestation failed");
        assert_eq!(err.to_string(), "Provider error (status 15005): attestation failed");

        let err = WalletError::provider_error(None, "boom");
        assert_eq!(err.to_string(), "Provider error: boom");
    }

    #[test]
    fn test_from_invoke_capability() {
        let provider = ProviderIdentity::GooglePay;
        assert_eq!(
            WalletError::from_invoke(provider, InvokeError::CapabilityAbsent("x".into())),
            WalletError::CapabilityUnavailable { provider }
        );
        assert_eq!(
            WalletError::from_invoke(provider, InvokeError::ClassNotFound("x".into())),
            WalletError::CapabilityUnavailable { provider }
        );
    }

    #[test]
    fn test_from_invoke_raised_keeps_status() {
        let err = InvokeError::Invocation {
            target: "TapAndPayClient.pushTokenize".into(),
            fault: NativeFault::with_status(15009, "unavailable"),
        };
        match WalletError::from_invoke(ProviderIdentity::GooglePay, err) {
            WalletError::ProviderError { status, reason } => {
                assert_eq!(status, Some(15009));
                assert!(reason.contains("pushTokenize"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_from_invoke_missing_method_is_provider_error() {
        let err = InvokeError::MethodNotFound {
            type_name: "CardManager".into(),
            method: "getAllCards".into(),
            arity: 2,
        };
        assert_eq!(
            WalletError::from_invoke(ProviderIdentity::SamsungPay, err).code(),
            "PROVIDER_ERROR"
        );
    }

    #[test]
    fn test_from_bridge_error() {
        let err: WalletError = BridgeError::OperationFailed("boom".into()).into();
        assert_eq!(err.code(), "PROVIDER_ERROR");

        let err = WalletError::from_host(
            ProviderIdentity::GooglePay,
            BridgeError::HostDetached("no activity".into()),
        );
        assert_eq!(err.code(), "NOT_INITIALIZED");
    }
}
