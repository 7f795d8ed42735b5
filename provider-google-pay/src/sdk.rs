//! Tap-and-pay SDK surface reached through the dynamic bridge.
//!
//! Class and method names below are the SDK's; nothing here links against
//! it. Asynchronous SDK calls return a `Task`, which is awaited by
//! registering an `OnCompleteListener` callback proxy.

use core_invoke::{Callbacks, DynamicBridge, Handle, InvokeError, Value};
use core_wallet::{CardNetwork, CredentialState, ProviderIdentity, Result, WalletError};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::debug;

pub const TAP_AND_PAY: &str = "com.google.android.gms.tapandpay.TapAndPay";
pub const PUSH_TOKENIZE_REQUEST_BUILDER: &str =
    "com.google.android.gms.tapandpay.issuer.PushTokenizeRequest$Builder";
pub const USER_ADDRESS_BUILDER: &str = "com.google.android.gms.tapandpay.issuer.UserAddress$Builder";
pub const VIEW_TOKEN_REQUEST_BUILDER: &str =
    "com.google.android.gms.tapandpay.issuer.ViewTokenRequest$Builder";
pub const ON_COMPLETE_LISTENER: &str = "com.google.android.gms.tasks.OnCompleteListener";

pub const TAP_AND_PAY_NO_ACTIVE_WALLET: i32 = 15002;
pub const TAP_AND_PAY_TOKEN_NOT_FOUND: i32 = 15003;

const PROVIDER: ProviderIdentity = ProviderIdentity::GooglePay;

/// Map an SDK status code onto the error taxonomy.
pub fn map_status(status: Option<i32>, message: impl Into<String>) -> WalletError {
    match status {
        Some(TAP_AND_PAY_NO_ACTIVE_WALLET) => WalletError::NoActiveWallet,
        Some(TAP_AND_PAY_TOKEN_NOT_FOUND) => WalletError::NotFound(message.into()),
        status => WalletError::provider_error(status, message),
    }
}

/// Bridge failures that carry a tap-and-pay status keep its meaning.
pub fn map_invoke(err: InvokeError) -> WalletError {
    match err.native_status() {
        Some(status @ (TAP_AND_PAY_NO_ACTIVE_WALLET | TAP_AND_PAY_TOKEN_NOT_FOUND)) => {
            map_status(Some(status), err.to_string())
        }
        _ => WalletError::from_invoke(PROVIDER, err),
    }
}

pub fn expect_object(value: Value, what: &str) -> Result<Handle> {
    let actual = value.type_label();
    value.into_object().ok_or_else(|| {
        WalletError::provider_error(None, format!("{what} returned {actual}, expected an object"))
    })
}

/// Wait for a `Task` to complete and return its result.
pub async fn await_task(bridge: &DynamicBridge, task: Value, what: &str) -> Result<Value> {
    let task = expect_object(task, what)?;
    let (tx, rx) = oneshot::channel::<Result<Value>>();
    let slot = Arc::new(Mutex::new(Some(tx)));

    let reader = bridge.clone();
    let callbacks = Callbacks::new().on("onComplete", move |args| {
        let outcome = match args.into_iter().next().and_then(Value::into_object) {
            Some(completed) => task_outcome(&reader, &completed),
            None => Err(WalletError::provider_error(None, "onComplete without a task")),
        };
        if let Some(sender) = slot.lock().take() {
            sender.send(outcome).ok();
        }
        Value::Null
    });

    let listener = bridge
        .make_callback_proxy(ON_COMPLETE_LISTENER, callbacks)
        .map_err(map_invoke)?;
    bridge
        .invoke(&task, "addOnCompleteListener", vec![Value::Object(listener)])
        .map_err(map_invoke)?;

    debug!(task = what, "Waiting for task completion");
    rx.await.unwrap_or_else(|_| {
        Err(WalletError::provider_error(
            None,
            format!("{what} task was dropped without completing"),
        ))
    })
}

fn task_outcome(bridge: &DynamicBridge, task: &Handle) -> Result<Value> {
    if get_bool(bridge, task, "isSuccessful")? {
        return bridge.invoke(task, "getResult", Vec::new()).map_err(map_invoke);
    }

    let exception = bridge
        .invoke(task, "getException", Vec::new())
        .map_err(map_invoke)?;
    let Some(exception) = exception.into_object() else {
        return Err(WalletError::provider_error(None, "Task failed without an exception"));
    };

    // Only ApiException carries a status code
    let status = bridge
        .invoke(&exception, "getStatusCode", Vec::new())
        .ok()
        .and_then(|v| v.as_i32());
    let message = bridge
        .invoke(&exception, "getMessage", Vec::new())
        .ok()
        .and_then(Value::into_string)
        .unwrap_or_else(|| exception.type_name().to_string());

    Err(map_status(status, message))
}

pub fn get_str(bridge: &DynamicBridge, target: &Handle, getter: &str) -> Result<String> {
    get_opt_str(bridge, target, getter)?.ok_or_else(|| {
        WalletError::provider_error(None, format!("{}.{getter} returned no string", target.type_name()))
    })
}

pub fn get_opt_str(bridge: &DynamicBridge, target: &Handle, getter: &str) -> Result<Option<String>> {
    let value = bridge.invoke(target, getter, Vec::new()).map_err(map_invoke)?;
    Ok(value.into_string())
}

pub fn get_int(bridge: &DynamicBridge, target: &Handle, getter: &str) -> Result<i64> {
    bridge
        .invoke(target, getter, Vec::new())
        .map_err(map_invoke)?
        .as_i64()
        .ok_or_else(|| {
            WalletError::provider_error(None, format!("{}.{getter} returned no integer", target.type_name()))
        })
}

pub fn get_bool(bridge: &DynamicBridge, target: &Handle, getter: &str) -> Result<bool> {
    bridge
        .invoke(target, getter, Vec::new())
        .map_err(map_invoke)?
        .as_bool()
        .ok_or_else(|| {
            WalletError::provider_error(None, format!("{}.{getter} returned no boolean", target.type_name()))
        })
}

pub fn token_state(code: i64) -> CredentialState {
    match code {
        1 => CredentialState::Untokenized,
        2 => CredentialState::Pending,
        3 => CredentialState::NeedsIdentityVerification,
        4 => CredentialState::Suspended,
        5 => CredentialState::Active,
        6 => CredentialState::FelicaPendingProvisioning,
        _ => CredentialState::Unknown,
    }
}

pub fn card_network(code: i64) -> Option<CardNetwork> {
    let network = match code {
        1 => CardNetwork::Amex,
        2 => CardNetwork::Discover,
        3 => CardNetwork::Mastercard,
        4 => CardNetwork::Visa,
        5 => CardNetwork::Interac,
        6 => CardNetwork::PrivateLabel,
        7 => CardNetwork::Eftpos,
        8 => CardNetwork::Maestro,
        11 => CardNetwork::Jcb,
        12 => CardNetwork::Elo,
        _ => return None,
    };
    Some(network)
}

/// Key of the token service provider constant for `network`.
///
/// Maestro cards are tokenized by the Mastercard TSP.
pub fn token_provider_key(network: CardNetwork) -> Result<String> {
    match network {
        CardNetwork::Maestro => Ok("TOKEN_PROVIDER_MASTERCARD".to_string()),
        CardNetwork::PrivateLabel => Err(WalletError::InvalidInput(
            "Private label cards have no token service provider".to_string(),
        )),
        other => Ok(format!("TOKEN_PROVIDER_{}", other.key())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_invoke::NativeFault;

    #[test]
    fn test_status_mapping() {
        assert_eq!(map_status(Some(15002), "no wallet"), WalletError::NoActiveWallet);
        assert_eq!(
            map_status(Some(15003), "gone"),
            WalletError::NotFound("gone".to_string())
        );
        assert_eq!(
            map_status(Some(15005), "attestation"),
            WalletError::provider_error(Some(15005), "attestation")
        );
        assert_eq!(map_status(None, "x").code(), "PROVIDER_ERROR");
    }

    #[test]
    fn test_invoke_mapping_keeps_status() {
        let raised = InvokeError::Invocation {
            target: "TapAndPayClient.getActiveWalletId".into(),
            fault: NativeFault::with_status(15002, "no active wallet"),
        };
        assert_eq!(map_invoke(raised), WalletError::NoActiveWallet);

        let absent = InvokeError::ClassNotFound(TAP_AND_PAY.into());
        assert_eq!(
            map_invoke(absent),
            WalletError::CapabilityUnavailable { provider: PROVIDER }
        );
    }

    #[test]
    fn test_code_tables() {
        assert_eq!(token_state(5), CredentialState::Active);
        assert_eq!(token_state(99), CredentialState::Unknown);
        assert_eq!(card_network(4), Some(CardNetwork::Visa));
        assert_eq!(card_network(9), None);
        assert_eq!(token_provider_key(CardNetwork::Visa).unwrap(), "TOKEN_PROVIDER_VISA");
        assert_eq!(
            token_provider_key(CardNetwork::Maestro).unwrap(),
            "TOKEN_PROVIDER_MASTERCARD"
        );
        assert!(token_provider_key(CardNetwork::PrivateLabel).is_err());
    }
}
