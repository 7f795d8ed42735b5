//! # Wallet Operation Facade
//!
//! The contract every adapter variant of every provider implements, and the
//! only thing the application layer depends on.
//!
//! ## Overview
//!
//! - `check_availability` and `get_constants` return plain values: they
//!   cannot fail, whatever the variant.
//! - Every other operation fails with exactly one [`WalletError`] kind.
//! - Operations marked *host-UI* arm the adapter's correlator and settle
//!   when the host reports the matching [`ActivityResult`] through
//!   [`WalletAdapter::on_host_result`]. Issue at most one of them at a time
//!   per adapter.

use async_trait::async_trait;
use bridge_traits::{ActivityResult, HostIntent};
use core_invoke::{Handle, Value};
use std::sync::Arc;

use crate::constants::Constants;
use crate::error::{Result, WalletError};
use crate::router::MessageClassifier;
use crate::types::{
    AdapterVariant, CardRecord, CredentialReference, CredentialStatus, ProviderIdentity,
    ProvisionRequest, TokenRecord, WalletIdentity,
};

/// Native handle of the screen hosting wallet flows, handed to Real
/// adapters during setup.
#[derive(Debug, Clone, Default)]
pub struct HostContext {
    activity: Value,
}

impl HostContext {
    pub fn new(activity: Handle) -> Self {
        Self {
            activity: Value::Object(activity),
        }
    }

    /// Context without a native activity; Real adapters refuse it.
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn activity(&self) -> Option<&Handle> {
        self.activity.as_object()
    }

    pub fn activity_value(&self) -> Value {
        self.activity.clone()
    }
}

#[async_trait]
pub trait WalletAdapter: Send + Sync {
    fn provider(&self) -> ProviderIdentity;

    fn variant(&self) -> AdapterVariant;

    /// Setup step. Real adapters fail with `NotInitialized` before it
    /// succeeds; Mock and Stub accept any context.
    fn initialize(&self, context: HostContext) -> Result<()>;

    /// Whether the provider can be used on this device. Never fails.
    async fn check_availability(&self) -> bool;

    async fn get_wallet_identity(&self) -> Result<WalletIdentity>;

    async fn get_credential_status(
        &self,
        reference: &CredentialReference,
    ) -> Result<CredentialStatus>;

    /// Empty when the wallet holds no cards.
    async fn list_credentials(&self) -> Result<Vec<CardRecord>>;

    async fn list_tokens(&self) -> Result<Vec<TokenRecord>>;

    /// Push a card into the wallet (host-UI). Resolves with the credential id.
    async fn provision_credential(&self, request: ProvisionRequest) -> Result<String>;

    /// `true` when a wallet was created, `false` when one already existed (host-UI).
    async fn create_wallet_if_needed(&self) -> Result<bool>;

    /// Open the provider's details screen for a credential (host-UI).
    async fn view_token(&self, reference: &CredentialReference) -> Result<()>;

    /// Ask the user to make this app the default NFC payment app (host-UI).
    async fn request_default_nfc_payment(&self) -> Result<bool>;

    /// Never fails; Stub adapters return sentinels.
    fn get_constants(&self) -> Constants;

    /// Feed a host completion to this adapter. `true` when it settled the
    /// operation this adapter was waiting on.
    fn on_host_result(&self, result: &ActivityResult) -> bool;

    /// Inbound-message policy of this variant.
    fn classifier(&self) -> Arc<dyn MessageClassifier>;
}

/// Platform action asking the user to change the default payment app.
pub const ACTION_CHANGE_DEFAULT: &str = "android.nfc.cardemulation.action.ACTION_CHANGE_DEFAULT";

/// Intent launched for `request_default_nfc_payment`.
pub fn default_payment_intent() -> HostIntent {
    HostIntent::new(ACTION_CHANGE_DEFAULT).with_extra("category", "payment")
}

/// Fail with `InvalidInput` unless the reference is usable.
pub fn check_reference(reference: &CredentialReference) -> Result<()> {
    reference.validate()
}

/// The error every operation of an unusable provider fails with.
pub fn capability_unavailable(provider: ProviderIdentity) -> WalletError {
    WalletError::CapabilityUnavailable { provider }
}
