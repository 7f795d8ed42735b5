//! Mock Samsung Pay adapter.
//!
//! Cards live in memory; an optional mock backend can override the canned
//! answers, and any backend failure falls back to them.

use async_trait::async_trait;
use bridge_traits::{ActivityResult, HttpClient};
use core_runtime::config::ProviderSettings;
use core_wallet::adapter::check_reference;
use core_wallet::constants::SAMSUNG_PAY_CONSTANTS;
use core_wallet::{
    AdapterVariant, AllowListClassifier, CardNetwork, CardRecord, Constants, CredentialReference,
    CredentialState, CredentialStatus, HostContext, MessageClassifier, MockBackend,
    ProviderIdentity, ProvisionRequest, Result, TokenRecord, WalletAdapter, WalletError,
    WalletIdentity,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::classifier::mock_classifier;
use crate::sdk;

const PROVIDER: ProviderIdentity = ProviderIdentity::SamsungPay;

pub const MOCK_DEVICE_ID: &str = "mock-samsung-device";
pub const MOCK_WALLET_USER_ID: &str = "mock-samsung-user";
pub const MOCK_CARD_ID: &str = "mock-samsung-card-1";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddCardBody<'a> {
    network: CardNetwork,
    display_name: &'a str,
    last_digits: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddCardReply {
    card_id: String,
}

#[derive(Debug, Deserialize)]
struct ActivationReply {
    activated: bool,
}

fn seeded_card() -> CardRecord {
    CardRecord {
        identifier: MOCK_CARD_ID.to_string(),
        last_digits: "5454".to_string(),
        display_name: "Mock Mastercard".to_string(),
        issuer_name: "Mock Issuer".to_string(),
        network: Some(CardNetwork::Mastercard),
        state: CredentialState::Active,
        is_default: false,
    }
}

pub struct MockSamsungPayAdapter {
    backend: MockBackend,
    cards: Mutex<Vec<CardRecord>>,
    classifier: Arc<AllowListClassifier>,
}

impl MockSamsungPayAdapter {
    pub fn new(http_client: Option<Arc<dyn HttpClient>>, settings: &ProviderSettings) -> Self {
        Self {
            backend: MockBackend::new(PROVIDER, http_client, settings),
            cards: Mutex::new(vec![seeded_card()]),
            classifier: Arc::new(mock_classifier(settings)),
        }
    }
}

#[async_trait]
impl WalletAdapter for MockSamsungPayAdapter {
    fn provider(&self) -> ProviderIdentity {
        PROVIDER
    }

    fn variant(&self) -> AdapterVariant {
        AdapterVariant::Mock
    }

    fn initialize(&self, _context: HostContext) -> Result<()> {
        Ok(())
    }

    async fn check_availability(&self) -> bool {
        true
    }

    async fn get_wallet_identity(&self) -> Result<WalletIdentity> {
        Ok(self
            .backend
            .get("wallet-info")
            .await
            .unwrap_or_else(|| WalletIdentity {
                device_id: MOCK_DEVICE_ID.to_string(),
                wallet_account_id: MOCK_WALLET_USER_ID.to_string(),
            }))
    }

    async fn get_credential_status(
        &self,
        reference: &CredentialReference,
    ) -> Result<CredentialStatus> {
        check_reference(reference)?;
        let cards = self.list_credentials().await?;
        cards
            .into_iter()
            .find(|card| card.identifier == reference.id)
            .map(|card| CredentialStatus {
                state: card.state,
                is_selected: false,
            })
            .ok_or_else(|| WalletError::NotFound(format!("Card {} is not in Samsung Pay", reference.id)))
    }

    async fn list_credentials(&self) -> Result<Vec<CardRecord>> {
        if let Some(cards) = self.backend.get::<Vec<CardRecord>>("cards").await {
            return Ok(cards);
        }
        Ok(self.cards.lock().clone())
    }

    async fn list_tokens(&self) -> Result<Vec<TokenRecord>> {
        let cards = self.list_credentials().await?;
        Ok(cards
            .into_iter()
            .map(|card| TokenRecord {
                token_reference_id: card.identifier,
                issuer_token_id: None,
                fpan_last_digits: card.last_digits,
                dpan_last_digits: None,
                issuer_name: card.issuer_name,
                network: card.network,
                state: card.state,
                is_default: card.is_default,
            })
            .collect())
    }

    async fn provision_credential(&self, request: ProvisionRequest) -> Result<String> {
        request.validate()?;
        sdk::provider_key(request.network)?;

        let body = AddCardBody {
            network: request.network,
            display_name: &request.issuer.display_name,
            last_digits: &request.issuer.last_digits,
        };
        let card_id = match self.backend.post::<_, AddCardReply>("add-card", &body).await {
            Some(reply) => reply.card_id,
            None => format!("mock-{}", Uuid::new_v4()),
        };

        self.cards.lock().push(CardRecord {
            identifier: card_id.clone(),
            last_digits: request.issuer.last_digits.clone(),
            display_name: request.issuer.display_name.clone(),
            issuer_name: request.issuer.display_name.clone(),
            network: Some(request.network),
            state: CredentialState::Active,
            is_default: false,
        });

        info!(card = %card_id, "Mock add card succeeded");
        Ok(card_id)
    }

    async fn create_wallet_if_needed(&self) -> Result<bool> {
        Ok(self
            .backend
            .post::<_, ActivationReply>("activate", &serde_json::json!({}))
            .await
            .map(|reply| reply.activated)
            .unwrap_or(false))
    }

    async fn view_token(&self, reference: &CredentialReference) -> Result<()> {
        check_reference(reference)?;
        Err(WalletError::provider_error(
            None,
            "Samsung Pay has no token details screen",
        ))
    }

    async fn request_default_nfc_payment(&self) -> Result<bool> {
        Ok(true)
    }

    fn get_constants(&self) -> Constants {
        SAMSUNG_PAY_CONSTANTS.fallbacks()
    }

    fn on_host_result(&self, _result: &ActivityResult) -> bool {
        false
    }

    fn classifier(&self) -> Arc<dyn MessageClassifier> {
        self.classifier.clone()
    }
}

impl std::fmt::Debug for MockSamsungPayAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSamsungPayAdapter")
            .field("backend", &self.backend)
            .field("cards", &self.cards.lock().len())
            .finish()
    }
}
