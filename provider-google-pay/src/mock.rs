//! Mock Google Pay adapter for development builds and emulators.
//!
//! Tokens live in memory. When a mock backend is configured its answers take
//! precedence; any backend failure falls back to the canned data.

use async_trait::async_trait;
use bridge_traits::{ActivityResult, HttpClient};
use core_runtime::config::ProviderSettings;
use core_wallet::adapter::check_reference;
use core_wallet::constants::GOOGLE_PAY_CONSTANTS;
use core_wallet::{
    AdapterVariant, AllowListClassifier, CardNetwork, CardRecord, Constants, CredentialReference,
    CredentialState, CredentialStatus, HostContext, MessageClassifier, MockBackend,
    ProviderIdentity, ProvisionRequest, Result, TokenRecord, WalletAdapter, WalletError,
    WalletIdentity,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::classifier::mock_classifier;

const PROVIDER: ProviderIdentity = ProviderIdentity::GooglePay;

pub const MOCK_DEVICE_ID: &str = "mock-google-device";
pub const MOCK_WALLET_ID: &str = "mock-google-wallet";
pub const MOCK_TOKEN_ID: &str = "mock-google-token-1";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PushTokenizeBody<'a> {
    network: CardNetwork,
    display_name: &'a str,
    last_digits: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PushTokenizeReply {
    issuer_token_id: String,
}

#[derive(Debug, Deserialize)]
struct CreatedReply {
    created: bool,
}

fn seeded_token() -> TokenRecord {
    TokenRecord {
        token_reference_id: MOCK_TOKEN_ID.to_string(),
        issuer_token_id: Some(MOCK_TOKEN_ID.to_string()),
        fpan_last_digits: "4242".to_string(),
        dpan_last_digits: Some("0001".to_string()),
        issuer_name: "Mock Issuer".to_string(),
        network: Some(CardNetwork::Visa),
        state: CredentialState::Active,
        is_default: true,
    }
}

pub struct MockGooglePayAdapter {
    backend: MockBackend,
    tokens: Mutex<Vec<TokenRecord>>,
    classifier: Arc<AllowListClassifier>,
}

impl MockGooglePayAdapter {
    pub fn new(http_client: Option<Arc<dyn HttpClient>>, settings: &ProviderSettings) -> Self {
        Self {
            backend: MockBackend::new(PROVIDER, http_client, settings),
            tokens: Mutex::new(vec![seeded_token()]),
            classifier: Arc::new(mock_classifier(settings)),
        }
    }

    fn find(&self, id: &str) -> Option<TokenRecord> {
        self.tokens
            .lock()
            .iter()
            .find(|t| t.token_reference_id == id)
            .cloned()
    }
}

#[async_trait]
impl WalletAdapter for MockGooglePayAdapter {
    fn provider(&self) -> ProviderIdentity {
        PROVIDER
    }

    fn variant(&self) -> AdapterVariant {
        AdapterVariant::Mock
    }

    fn initialize(&self, _context: HostContext) -> Result<()> {
        debug!("Mock Google Pay adapter needs no host context");
        Ok(())
    }

    async fn check_availability(&self) -> bool {
        true
    }

    async fn get_wallet_identity(&self) -> Result<WalletIdentity> {
        Ok(self
            .backend
            .get("wallet-identity")
            .await
            .unwrap_or_else(|| WalletIdentity {
                device_id: MOCK_DEVICE_ID.to_string(),
                wallet_account_id: MOCK_WALLET_ID.to_string(),
            }))
    }

    async fn get_credential_status(
        &self,
        reference: &CredentialReference,
    ) -> Result<CredentialStatus> {
        check_reference(reference)?;
        if let Some(token) = self.find(&reference.id) {
            return Ok(CredentialStatus {
                state: token.state,
                is_selected: token.is_default,
            });
        }

        self.backend
            .get(&format!("tokens/{}/status", reference.id))
            .await
            .ok_or_else(|| WalletError::NotFound(format!("Token {} is not in the wallet", reference.id)))
    }

    async fn list_credentials(&self) -> Result<Vec<CardRecord>> {
        let tokens = self.list_tokens().await?;
        Ok(tokens
            .into_iter()
            .map(|token| CardRecord {
                identifier: token.token_reference_id,
                last_digits: token.fpan_last_digits,
                display_name: token.issuer_name.clone(),
                issuer_name: token.issuer_name,
                network: token.network,
                state: token.state,
                is_default: token.is_default,
            })
            .collect())
    }

    async fn list_tokens(&self) -> Result<Vec<TokenRecord>> {
        if let Some(tokens) = self.backend.get::<Vec<TokenRecord>>("tokens").await {
            return Ok(tokens);
        }
        Ok(self.tokens.lock().clone())
    }

    async fn provision_credential(&self, request: ProvisionRequest) -> Result<String> {
        request.validate()?;

        let body = PushTokenizeBody {
            network: request.network,
            display_name: &request.issuer.display_name,
            last_digits: &request.issuer.last_digits,
        };
        let issuer_token_id = match self
            .backend
            .post::<_, PushTokenizeReply>("push-tokenize", &body)
            .await
        {
            Some(reply) => reply.issuer_token_id,
            None => format!("mock-{}", Uuid::new_v4()),
        };

        self.tokens.lock().push(TokenRecord {
            token_reference_id: issuer_token_id.clone(),
            issuer_token_id: Some(issuer_token_id.clone()),
            fpan_last_digits: request.issuer.last_digits.clone(),
            dpan_last_digits: None,
            issuer_name: request.issuer.display_name.clone(),
            network: Some(request.network),
            state: CredentialState::Active,
            is_default: false,
        });

        info!(token = %issuer_token_id, "Mock push tokenize succeeded");
        Ok(issuer_token_id)
    }

    async fn create_wallet_if_needed(&self) -> Result<bool> {
        Ok(self
            .backend
            .post::<_, CreatedReply>("create-wallet", &serde_json::json!({}))
            .await
            .map(|reply| reply.created)
            .unwrap_or(false))
    }

    async fn view_token(&self, reference: &CredentialReference) -> Result<()> {
        check_reference(reference)?;
        match self.find(&reference.id) {
            Some(_) => Ok(()),
            None => Err(WalletError::NotFound(format!(
                "Token {} is not in the wallet",
                reference.id
            ))),
        }
    }

    async fn request_default_nfc_payment(&self) -> Result<bool> {
        Ok(true)
    }

    fn get_constants(&self) -> Constants {
        GOOGLE_PAY_CONSTANTS.fallbacks()
    }

    fn on_host_result(&self, _result: &ActivityResult) -> bool {
        false
    }

    fn classifier(&self) -> Arc<dyn MessageClassifier> {
        self.classifier.clone()
    }
}

impl std::fmt::Debug for MockGooglePayAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockGooglePayAdapter")
            .field("backend", &self.backend)
            .field("tokens", &self.tokens.lock().len())
            .finish()
    }
}
