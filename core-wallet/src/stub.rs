//! Stub adapter for providers whose SDK is absent.

use async_trait::async_trait;
use bridge_traits::ActivityResult;
use std::sync::Arc;
use tracing::debug;

use crate::adapter::{capability_unavailable, HostContext, WalletAdapter};
use crate::constants::{Constants, GOOGLE_PAY_CONSTANTS, SAMSUNG_PAY_CONSTANTS};
use crate::error::Result;
use crate::router::{MessageClassifier, RejectAllClassifier};
use crate::types::{
    AdapterVariant, CardRecord, CredentialReference, CredentialStatus, ProviderIdentity,
    ProvisionRequest, TokenRecord, WalletIdentity,
};

/// Keeps the full contract while rejecting every operation with
/// `CapabilityUnavailable`. Availability reads `false` and constants are
/// sentinels.
#[derive(Debug, Clone, Copy)]
pub struct StubAdapter {
    provider: ProviderIdentity,
}

impl StubAdapter {
    pub fn new(provider: ProviderIdentity) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl WalletAdapter for StubAdapter {
    fn provider(&self) -> ProviderIdentity {
        self.provider
    }

    fn variant(&self) -> AdapterVariant {
        AdapterVariant::Stub
    }

    fn initialize(&self, _context: HostContext) -> Result<()> {
        debug!(provider = %self.provider, "Stub adapter ignores host context");
        Ok(())
    }

    async fn check_availability(&self) -> bool {
        false
    }

    async fn get_wallet_identity(&self) -> Result<WalletIdentity> {
        Err(capability_unavailable(self.provider))
    }

    async fn get_credential_status(
        &self,
        _reference: &CredentialReference,
    ) -> Result<CredentialStatus> {
        Err(capability_unavailable(self.provider))
    }

    async fn list_credentials(&self) -> Result<Vec<CardRecord>> {
        Err(capability_unavailable(self.provider))
    }

    async fn list_tokens(&self) -> Result<Vec<TokenRecord>> {
        Err(capability_unavailable(self.provider))
    }

    async fn provision_credential(&self, _request: ProvisionRequest) -> Result<String> {
        Err(capability_unavailable(self.provider))
    }

    async fn create_wallet_if_needed(&self) -> Result<bool> {
        Err(capability_unavailable(self.provider))
    }

    async fn view_token(&self, _reference: &CredentialReference) -> Result<()> {
        Err(capability_unavailable(self.provider))
    }

    async fn request_default_nfc_payment(&self) -> Result<bool> {
        Err(capability_unavailable(self.provider))
    }

    fn get_constants(&self) -> Constants {
        match self.provider {
            ProviderIdentity::GooglePay => GOOGLE_PAY_CONSTANTS.sentinels(),
            ProviderIdentity::SamsungPay => SAMSUNG_PAY_CONSTANTS.sentinels(),
        }
    }

    fn on_host_result(&self, _result: &ActivityResult) -> bool {
        false
    }

    fn classifier(&self) -> Arc<dyn MessageClassifier> {
        Arc::new(RejectAllClassifier::new(self.provider))
    }
}
