//! Wallet data model.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, WalletError};

/// Request codes of host-UI operations. Both providers share the numbering.
pub mod operation_code {
    pub const VIEW_TOKEN: i32 = 1;
    pub const PUSH_TOKENIZE: i32 = 2;
    pub const SELECT_TOKEN: i32 = 3;
    pub const CREATE_WALLET: i32 = 4;
    pub const SET_DEFAULT_PAYMENTS: i32 = 5;
}

/// The wallet SDKs this crate adapts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProviderIdentity {
    /// Google tap-and-pay
    GooglePay,
    /// Samsung wallet
    SamsungPay,
}

impl ProviderIdentity {
    /// Order in which inbound messages are offered to classifiers.
    pub const ROUTING_ORDER: [ProviderIdentity; 2] =
        [ProviderIdentity::SamsungPay, ProviderIdentity::GooglePay];

    pub const ALL: [ProviderIdentity; 2] =
        [ProviderIdentity::GooglePay, ProviderIdentity::SamsungPay];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderIdentity::GooglePay => "GooglePay",
            ProviderIdentity::SamsungPay => "SamsungPay",
        }
    }

    /// Lower-case path segment, e.g. for mock backend routes.
    pub fn slug(&self) -> &'static str {
        match self {
            ProviderIdentity::GooglePay => "google-pay",
            ProviderIdentity::SamsungPay => "samsung-pay",
        }
    }

    /// Native class whose presence means the provider SDK is linked.
    pub fn marker_class(&self) -> &'static str {
        match self {
            ProviderIdentity::GooglePay => "com.google.android.gms.tapandpay.TapAndPay",
            ProviderIdentity::SamsungPay => "com.samsung.android.sdk.samsungpay.v2.SamsungPay",
        }
    }
}

impl fmt::Display for ProviderIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which implementation backs an adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdapterVariant {
    /// Native SDK present and called through the bridge
    Real,
    /// Simulated responses, optionally from a local test backend
    Mock,
    /// SDK absent; every operation is rejected
    Stub,
}

impl AdapterVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdapterVariant::Real => "Real",
            AdapterVariant::Mock => "Mock",
            AdapterVariant::Stub => "Stub",
        }
    }
}

impl fmt::Display for AdapterVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Card networks accepted for provisioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardNetwork {
    Visa,
    Mastercard,
    Amex,
    Discover,
    Interac,
    Eftpos,
    Maestro,
    Jcb,
    Elo,
    PrivateLabel,
}

impl CardNetwork {
    /// Upper-case key used in constant names, e.g. `CARD_NETWORK_VISA`.
    pub fn key(&self) -> &'static str {
        match self {
            CardNetwork::Visa => "VISA",
            CardNetwork::Mastercard => "MASTERCARD",
            CardNetwork::Amex => "AMEX",
            CardNetwork::Discover => "DISCOVER",
            CardNetwork::Interac => "INTERAC",
            CardNetwork::Eftpos => "EFTPOS",
            CardNetwork::Maestro => "MAESTRO",
            CardNetwork::Jcb => "JCB",
            CardNetwork::Elo => "ELO",
            CardNetwork::PrivateLabel => "PRIVATE_LABEL",
        }
    }
}

impl FromStr for CardNetwork {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self> {
        let network = match s.trim().to_ascii_uppercase().as_str() {
            "VISA" => CardNetwork::Visa,
            "MASTERCARD" => CardNetwork::Mastercard,
            "AMEX" | "AMERICANEXPRESS" => CardNetwork::Amex,
            "DISCOVER" => CardNetwork::Discover,
            "INTERAC" => CardNetwork::Interac,
            "EFTPOS" => CardNetwork::Eftpos,
            "MAESTRO" => CardNetwork::Maestro,
            "JCB" => CardNetwork::Jcb,
            "ELO" => CardNetwork::Elo,
            "PRIVATE_LABEL" => CardNetwork::PrivateLabel,
            other => {
                return Err(WalletError::InvalidInput(format!(
                    "Unknown card network: {other}"
                )))
            }
        };
        Ok(network)
    }
}

/// Lifecycle state of a provisioned credential, as reported by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CredentialState {
    Untokenized,
    Pending,
    NeedsIdentityVerification,
    Suspended,
    Active,
    FelicaPendingProvisioning,
    Expired,
    Disposed,
    Unknown,
}

/// Device and account the provider wallet is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletIdentity {
    pub device_id: String,
    pub wallet_account_id: String,
}

/// Identifies a credential for status/view lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialReference {
    /// Issuer token id (Google) or card id (Samsung)
    pub id: String,
    /// Token service provider, required by providers that scope ids per network
    pub network: Option<CardNetwork>,
}

impl CredentialReference {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            network: None,
        }
    }

    pub fn with_network(mut self, network: CardNetwork) -> Self {
        self.network = Some(network);
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(WalletError::InvalidInput(
                "Credential reference id cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialStatus {
    pub state: CredentialState,
    pub is_selected: bool,
}

/// Card-level projection of a provisioned credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRecord {
    pub identifier: String,
    pub last_digits: String,
    pub display_name: String,
    pub issuer_name: String,
    pub network: Option<CardNetwork>,
    pub state: CredentialState,
    pub is_default: bool,
}

/// Token-level projection of a provisioned credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    pub token_reference_id: String,
    pub issuer_token_id: Option<String>,
    /// Last digits of the funding card
    pub fpan_last_digits: String,
    /// Last digits of the device token, when the provider reports them
    pub dpan_last_digits: Option<String>,
    pub issuer_name: String,
    pub network: Option<CardNetwork>,
    pub state: CredentialState,
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingAddress {
    pub name: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub locality: String,
    pub administrative_area: Option<String>,
    /// ISO 3166-1 alpha-2
    pub country_code: String,
    pub postal_code: String,
    pub phone_number: Option<String>,
}

impl BillingAddress {
    fn validate(&self) -> Result<()> {
        let required = [
            ("name", &self.name),
            ("addressLine1", &self.address_line1),
            ("locality", &self.locality),
            ("postalCode", &self.postal_code),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(WalletError::InvalidInput(format!(
                    "Billing address {field} is required"
                )));
            }
        }

        let country = self.country_code.trim();
        if country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(WalletError::InvalidInput(format!(
                "Billing address countryCode must be a two-letter code, got '{}'",
                self.country_code
            )));
        }

        Ok(())
    }
}

/// Card presentation supplied by the issuer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuerFields {
    pub display_name: String,
    pub last_digits: String,
}

/// Everything needed to push a card into a provider wallet.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionRequest {
    /// Issuer-encrypted card blob; opaque to this crate
    pub opaque_card: String,
    pub network: CardNetwork,
    pub billing_address: BillingAddress,
    pub issuer: IssuerFields,
}

impl fmt::Debug for ProvisionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvisionRequest")
            .field("opaque_card", &"[REDACTED]")
            .field("network", &self.network)
            .field("billing_address", &self.billing_address)
            .field("issuer", &self.issuer)
            .finish()
    }
}

impl ProvisionRequest {
    /// Local validation run before any SDK is involved.
    pub fn validate(&self) -> Result<()> {
        if self.opaque_card.trim().is_empty() {
            return Err(WalletError::InvalidInput(
                "Opaque payment card cannot be empty".to_string(),
            ));
        }

        if self.issuer.display_name.trim().is_empty() {
            return Err(WalletError::InvalidInput(
                "Card display name cannot be empty".to_string(),
            ));
        }

        let digits = &self.issuer.last_digits;
        if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(WalletError::InvalidInput(
                "Last digits must be exactly four digits".to_string(),
            ));
        }

        self.billing_address.validate()
    }
}
