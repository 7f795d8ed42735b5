//! Constants exposed to the application layer.
//!
//! Each provider publishes one schema. The Real variant reads the values
//! from the SDK's static fields, the Mock variant serves the schema
//! fallbacks and the Stub variant serves sentinels, so every variant of a
//! provider exposes exactly the same keys.

use core_invoke::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sentinel returned by Stub adapters for integer constants.
pub const STUB_INT_SENTINEL: i64 = -1;

/// Sentinel returned by Stub adapters for string constants.
pub const STUB_STR_SENTINEL: &str = "UNAVAILABLE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConstantValue {
    Int(i64),
    Str(String),
}

impl ConstantValue {
    /// Read a native static field value; other value kinds are not constants.
    pub fn from_native(value: &Value) -> Option<Self> {
        match value {
            Value::Int(v) => Some(ConstantValue::Int(*v)),
            Value::Str(s) => Some(ConstantValue::Str(s.clone())),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConstantValue::Int(v) => Some(*v),
            ConstantValue::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConstantValue::Str(s) => Some(s),
            ConstantValue::Int(_) => None,
        }
    }
}

pub type Constants = BTreeMap<String, ConstantValue>;

/// Documented value of a constant, used when the SDK cannot be asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    Int(i64),
    Str(&'static str),
}

impl Fallback {
    fn value(&self) -> ConstantValue {
        match self {
            Fallback::Int(v) => ConstantValue::Int(*v),
            Fallback::Str(s) => ConstantValue::Str((*s).to_string()),
        }
    }

    fn sentinel(&self) -> ConstantValue {
        match self {
            Fallback::Int(_) => ConstantValue::Int(STUB_INT_SENTINEL),
            Fallback::Str(_) => ConstantValue::Str(STUB_STR_SENTINEL.to_string()),
        }
    }
}

/// One exported constant and where the SDK keeps it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantSpec {
    /// Key exposed to the application layer
    pub key: &'static str,
    /// Native class holding the static field
    pub class: &'static str,
    pub field: &'static str,
    pub fallback: Fallback,
}

#[derive(Debug, Clone, Copy)]
pub struct ConstantSchema {
    pub entries: &'static [ConstantSpec],
}

impl ConstantSchema {
    /// Resolve every entry through `lookup`, falling back per entry when it
    /// returns `None`.
    pub fn resolve_with<F>(&self, mut lookup: F) -> Constants
    where
        F: FnMut(&ConstantSpec) -> Option<ConstantValue>,
    {
        self.entries
            .iter()
            .map(|spec| {
                let value = lookup(spec).unwrap_or_else(|| spec.fallback.value());
                (spec.key.to_string(), value)
            })
            .collect()
    }

    pub fn fallbacks(&self) -> Constants {
        self.resolve_with(|_| None)
    }

    pub fn sentinels(&self) -> Constants {
        self.entries
            .iter()
            .map(|spec| (spec.key.to_string(), spec.fallback.sentinel()))
            .collect()
    }

    pub fn spec(&self, key: &str) -> Option<&'static ConstantSpec> {
        self.entries.iter().find(|spec| spec.key == key)
    }

    pub fn int(&self, key: &str) -> Option<i64> {
        self.entries
            .iter()
            .find(|spec| spec.key == key)
            .and_then(|spec| match spec.fallback {
                Fallback::Int(v) => Some(v),
                Fallback::Str(_) => None,
            })
    }

    pub fn str(&self, key: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|spec| spec.key == key)
            .and_then(|spec| match spec.fallback {
                Fallback::Str(s) => Some(s),
                Fallback::Int(_) => None,
            })
    }
}

const TAP_AND_PAY: &str = "com.google.android.gms.tapandpay.TapAndPay";
const TAP_AND_PAY_STATUS: &str = "com.google.android.gms.tapandpay.TapAndPayStatusCodes";

const fn tap(key: &'static str, value: i64) -> ConstantSpec {
    ConstantSpec {
        key,
        class: TAP_AND_PAY,
        field: key,
        fallback: Fallback::Int(value),
    }
}

const fn tap_status(key: &'static str, field: &'static str, value: i64) -> ConstantSpec {
    ConstantSpec {
        key,
        class: TAP_AND_PAY_STATUS,
        field,
        fallback: Fallback::Int(value),
    }
}

/// Google Pay (tap-and-pay) constants.
pub const GOOGLE_PAY_CONSTANTS: ConstantSchema = ConstantSchema {
    entries: &[
        tap("TOKEN_STATE_UNTOKENIZED", 1),
        tap("TOKEN_STATE_PENDING", 2),
        tap("TOKEN_STATE_NEEDS_IDENTITY_VERIFICATION", 3),
        tap("TOKEN_STATE_SUSPENDED", 4),
        tap("TOKEN_STATE_ACTIVE", 5),
        tap("TOKEN_STATE_FELICA_PENDING_PROVISIONING", 6),
        tap("CARD_NETWORK_AMEX", 1),
        tap("CARD_NETWORK_DISCOVER", 2),
        tap("CARD_NETWORK_MASTERCARD", 3),
        tap("CARD_NETWORK_VISA", 4),
        tap("CARD_NETWORK_INTERAC", 5),
        tap("CARD_NETWORK_PRIVATE_LABEL", 6),
        tap("CARD_NETWORK_EFTPOS", 7),
        tap("CARD_NETWORK_MAESTRO", 8),
        tap("CARD_NETWORK_JCB", 11),
        tap("CARD_NETWORK_ELO", 12),
        tap("TOKEN_PROVIDER_AMEX", 2),
        tap("TOKEN_PROVIDER_MASTERCARD", 3),
        tap("TOKEN_PROVIDER_VISA", 4),
        tap("TOKEN_PROVIDER_DISCOVER", 5),
        tap("TOKEN_PROVIDER_EFTPOS", 6),
        tap("TOKEN_PROVIDER_INTERAC", 7),
        tap("TOKEN_PROVIDER_JCB", 13),
        tap("TOKEN_PROVIDER_ELO", 14),
        tap_status("TAP_AND_PAY_NO_ACTIVE_WALLET", "TAP_AND_PAY_NO_ACTIVE_WALLET", 15002),
        tap_status("TAP_AND_PAY_TOKEN_NOT_FOUND", "TAP_AND_PAY_TOKEN_NOT_FOUND", 15003),
        tap_status(
            "TAP_AND_PAY_INVALID_TOKEN_STATE",
            "TAP_AND_PAY_INVALID_TOKEN_STATE",
            15004,
        ),
        tap_status("TAP_AND_PAY_ATTESTATION_ERROR", "TAP_AND_PAY_ATTESTATION_ERROR", 15005),
        tap_status("TAP_AND_PAY_UNAVAILABLE", "TAP_AND_PAY_UNAVAILABLE", 15009),
        ConstantSpec {
            key: "EXTRA_ISSUER_TOKEN_ID",
            class: TAP_AND_PAY,
            field: "EXTRA_ISSUER_TOKEN_ID",
            fallback: Fallback::Str("extra_issuer_token_id"),
        },
    ],
};

const SAMSUNG_PAY: &str = "com.samsung.android.sdk.samsungpay.v2.SpaySdk";
const SAMSUNG_CARD: &str = "com.samsung.android.sdk.samsungpay.v2.card.Card";
const SAMSUNG_ADD_CARD_INFO: &str = "com.samsung.android.sdk.samsungpay.v2.card.AddCardInfo";

const fn spay(key: &'static str, value: i64) -> ConstantSpec {
    ConstantSpec {
        key,
        class: SAMSUNG_PAY,
        field: key,
        fallback: Fallback::Int(value),
    }
}

const fn spay_str(key: &'static str, class: &'static str, field: &'static str, value: &'static str) -> ConstantSpec {
    ConstantSpec {
        key,
        class,
        field,
        fallback: Fallback::Str(value),
    }
}

/// Samsung Pay constants.
pub const SAMSUNG_PAY_CONSTANTS: ConstantSchema = ConstantSchema {
    entries: &[
        spay("SPAY_NOT_SUPPORTED", 0),
        spay("SPAY_NOT_READY", 1),
        spay("SPAY_READY", 2),
        spay("SPAY_NOT_ALLOWED_TEMPORALLY", 3),
        spay("ERROR_NONE", 0),
        spay("ERROR_USER_CANCELED", -7),
        spay("ERROR_SPAY_SETUP_NOT_COMPLETED", -356),
        spay("ERROR_SPAY_APP_NEED_TO_UPDATE", -357),
        spay_str("CARD_STATE_ACTIVE", SAMSUNG_CARD, "ACTIVE", "ACTIVE"),
        spay_str("CARD_STATE_DISPOSED", SAMSUNG_CARD, "DISPOSED", "DISPOSED"),
        spay_str("CARD_STATE_EXPIRED", SAMSUNG_CARD, "EXPIRED", "EXPIRED"),
        spay_str("CARD_STATE_PENDING_ENROLLED", SAMSUNG_CARD, "PENDING_ENROLLED", "PENDING_ENROLLED"),
        spay_str("CARD_STATE_PENDING_PROVISION", SAMSUNG_CARD, "PENDING_PROVISION", "PENDING_PROVISION"),
        spay_str("CARD_STATE_SUSPENDED", SAMSUNG_CARD, "SUSPENDED", "SUSPENDED"),
        spay_str("CARD_TYPE_PAYMENT", SAMSUNG_ADD_CARD_INFO, "CARD_TYPE_PAYMENT", "PAYMENT"),
        spay_str("PROVIDER_VISA", SAMSUNG_ADD_CARD_INFO, "PROVIDER_VISA", "VI"),
        spay_str("PROVIDER_MASTERCARD", SAMSUNG_ADD_CARD_INFO, "PROVIDER_MASTERCARD", "MC"),
        spay_str("PROVIDER_AMEX", SAMSUNG_ADD_CARD_INFO, "PROVIDER_AMEX", "AX"),
        spay_str("PROVIDER_DISCOVER", SAMSUNG_ADD_CARD_INFO, "PROVIDER_DISCOVER", "DS"),
        spay_str(
            "EXTRA_PROVISION_PAYLOAD",
            SAMSUNG_ADD_CARD_INFO,
            "EXTRA_PROVISION_PAYLOAD",
            "provisionPayload",
        ),
    ],
};
