//! Samsung Pay SDK surface reached through the dynamic bridge.
//!
//! The SDK reports every asynchronous outcome through listener interfaces
//! (`onSuccess` / `onFail(errorCode, extras)`). [`Completion`] turns one
//! such listener into a single awaited result.

use core_invoke::{DynamicBridge, Handle, InvokeError, Value};
use core_wallet::{CardNetwork, CredentialState, ProviderIdentity, Result, WalletError};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::oneshot;

pub const SAMSUNG_PAY: &str = "com.samsung.android.sdk.samsungpay.v2.SamsungPay";
pub const PARTNER_INFO: &str = "com.samsung.android.sdk.samsungpay.v2.PartnerInfo";
pub const CARD_MANAGER: &str = "com.samsung.android.sdk.samsungpay.v2.card.CardManager";
pub const ADD_CARD_INFO: &str = "com.samsung.android.sdk.samsungpay.v2.card.AddCardInfo";
pub const STATUS_LISTENER: &str = "com.samsung.android.sdk.samsungpay.v2.StatusListener";
pub const GET_CARD_LISTENER: &str = "com.samsung.android.sdk.samsungpay.v2.card.GetCardListener";
pub const ADD_CARD_LISTENER: &str = "com.samsung.android.sdk.samsungpay.v2.card.AddCardListener";

pub const PARTNER_SERVICE_TYPE: &str = "PartnerServiceType";
pub const SERVICE_TYPE_APP2APP: &str = "APP2APP";
pub const EXTRA_ERROR_REASON: &str = "errorReason";
pub const WALLET_DEVICE_ID: &str = "deviceId";
pub const WALLET_USER_ID: &str = "walletUserId";

pub const SPAY_NOT_SUPPORTED: i64 = 0;
pub const SPAY_NOT_READY: i64 = 1;
pub const SPAY_READY: i64 = 2;
pub const ERROR_USER_CANCELED: i64 = -7;
pub const ERROR_SPAY_APP_NEED_TO_UPDATE: i64 = -357;

const PROVIDER: ProviderIdentity = ProviderIdentity::SamsungPay;

pub fn map_invoke(err: InvokeError) -> WalletError {
    WalletError::from_invoke(PROVIDER, err)
}

/// Error for an `onFail(errorCode, extras)` callback.
pub fn fail_error(args: &[Value], operation: &str) -> WalletError {
    match args.first().and_then(Value::as_i64) {
        Some(ERROR_USER_CANCELED) => WalletError::UserCanceled,
        code => WalletError::provider_error(
            code.and_then(|c| i32::try_from(c).ok()),
            format!("Samsung Pay {operation} failed"),
        ),
    }
}

/// One-shot settlement shared by the callbacks of a single listener.
pub struct Completion<T> {
    slot: Arc<Mutex<Option<oneshot::Sender<Result<T>>>>>,
}

impl<T> Clone for Completion<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T: Send + 'static> Completion<T> {
    pub fn new() -> (Self, oneshot::Receiver<Result<T>>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                slot: Arc::new(Mutex::new(Some(tx))),
            },
            rx,
        )
    }

    /// Only the first settlement counts.
    pub fn settle(&self, outcome: Result<T>) {
        if let Some(sender) = self.slot.lock().take() {
            sender.send(outcome).ok();
        }
    }
}

pub async fn wait<T>(rx: oneshot::Receiver<Result<T>>, operation: &str) -> Result<T> {
    rx.await.unwrap_or_else(|_| {
        Err(WalletError::provider_error(
            None,
            format!("Samsung Pay dropped the {operation} listener without answering"),
        ))
    })
}

/// Bundle argument as a string map; non-string entries are skipped.
pub fn bundle(value: Option<&Value>) -> BTreeMap<String, String> {
    value
        .and_then(Value::as_map)
        .map(|map| {
            map.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

/// A card as reported by `CardManager`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamsungCard {
    pub card_id: String,
    pub state: CredentialState,
    pub network: Option<CardNetwork>,
    pub info: BTreeMap<String, String>,
}

impl SamsungCard {
    pub fn read(bridge: &DynamicBridge, card: &Handle) -> Result<Self> {
        let text = |getter: &str| -> Result<Option<String>> {
            Ok(bridge
                .invoke(card, getter, Vec::new())
                .map_err(map_invoke)?
                .into_string())
        };

        let card_id = text("getCardId")?
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| WalletError::provider_error(None, "Samsung Pay card without an id"))?;
        let info = bridge
            .invoke(card, "getCardInfo", Vec::new())
            .map_err(map_invoke)?;

        Ok(Self {
            card_id,
            state: card_state(text("getCardStatus")?.as_deref().unwrap_or_default()),
            network: text("getCardBrand")?.as_deref().and_then(card_network),
            info: bundle(Some(&info)),
        })
    }

    pub fn info(&self, key: &str) -> Option<&str> {
        self.info.get(key).map(String::as_str)
    }
}

pub fn card_state(status: &str) -> CredentialState {
    match status {
        "ACTIVE" => CredentialState::Active,
        "PENDING_ENROLLED" | "PENDING_PROVISION" => CredentialState::Pending,
        "SUSPENDED" => CredentialState::Suspended,
        "EXPIRED" => CredentialState::Expired,
        "DISPOSED" => CredentialState::Disposed,
        _ => CredentialState::Unknown,
    }
}

pub fn card_network(brand: &str) -> Option<CardNetwork> {
    match brand {
        "VI" => Some(CardNetwork::Visa),
        "MC" => Some(CardNetwork::Mastercard),
        "AX" => Some(CardNetwork::Amex),
        "DS" => Some(CardNetwork::Discover),
        _ => None,
    }
}

/// Key of the tokenization provider constant for `network`.
pub fn provider_key(network: CardNetwork) -> Result<String> {
    match network {
        CardNetwork::Visa | CardNetwork::Mastercard | CardNetwork::Amex | CardNetwork::Discover => {
            Ok(format!("PROVIDER_{}", network.key()))
        }
        other => Err(WalletError::InvalidInput(format!(
            "Samsung Pay cannot provision {} cards",
            other.key()
        ))),
    }
}
