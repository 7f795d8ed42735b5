//! Google Pay adapter over the tap-and-pay SDK.

use async_trait::async_trait;
use bridge_traits::{ActivityResult, HostContainer};
use core_invoke::{DynamicBridge, Handle, Value};
use core_runtime::config::ProviderSettings;
use core_runtime::events::EventBus;
use core_wallet::adapter::check_reference;
use core_wallet::constants::GOOGLE_PAY_CONSTANTS;
use core_wallet::{
    default_payment_intent, operation_code, AdapterVariant, AllowListClassifier, CardNetwork,
    CardRecord, ConstantValue, Constants, CredentialReference, CredentialStatus, HostContext,
    MessageClassifier, OperationCorrelator, ProviderIdentity, ProvisionRequest, Result,
    TokenRecord, WalletAdapter, WalletError, WalletIdentity,
};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::classifier::classifier;
use crate::sdk::{self, map_invoke};

const PROVIDER: ProviderIdentity = ProviderIdentity::GooglePay;

#[derive(Clone)]
struct Session {
    activity: Value,
    client: Handle,
}

/// Real Google Pay adapter.
///
/// All SDK access goes through the [`DynamicBridge`]; host-UI operations
/// (push tokenize, create wallet, view token, default payment app) settle
/// through [`WalletAdapter::on_host_result`].
pub struct GooglePayAdapter {
    bridge: DynamicBridge,
    host: Arc<dyn HostContainer>,
    correlator: OperationCorrelator,
    session: RwLock<Option<Session>>,
    classifier: Arc<AllowListClassifier>,
}

impl GooglePayAdapter {
    pub fn new(
        bridge: DynamicBridge,
        host: Arc<dyn HostContainer>,
        settings: &ProviderSettings,
    ) -> Self {
        Self {
            bridge,
            host,
            correlator: OperationCorrelator::new(PROVIDER),
            session: RwLock::new(None),
            classifier: Arc::new(classifier(settings)),
        }
    }

    pub fn with_events(mut self, events: EventBus) -> Self {
        self.correlator = OperationCorrelator::new(PROVIDER).with_events(events);
        self
    }

    fn session(&self) -> Result<Session> {
        self.session.read().clone().ok_or_else(|| {
            WalletError::not_initialized(PROVIDER, "initialize() has not been called")
        })
    }

    /// SDK value of an integer constant, or its documented fallback.
    fn constant_int(&self, key: &str) -> Result<i64> {
        self.constant(key)
            .and_then(|v| v.as_i64())
            .ok_or_else(|| WalletError::provider_error(None, format!("Unknown constant {key}")))
    }

    fn constant_str(&self, key: &str) -> Result<String> {
        self.constant(key)
            .and_then(|v| v.as_str().map(str::to_string))
            .ok_or_else(|| WalletError::provider_error(None, format!("Unknown constant {key}")))
    }

    fn constant(&self, key: &str) -> Option<ConstantValue> {
        let spec = GOOGLE_PAY_CONSTANTS.spec(key)?;
        self.bridge
            .get_static(spec.class, spec.field)
            .ok()
            .and_then(|v| ConstantValue::from_native(&v))
            .or_else(|| GOOGLE_PAY_CONSTANTS.fallbacks().remove(key))
    }

    fn token_provider(&self, network: CardNetwork) -> Result<i64> {
        self.constant_int(&sdk::token_provider_key(network)?)
    }

    async fn call_task(&self, client: &Handle, method: &str, args: Vec<Value>) -> Result<Value> {
        let task = self.bridge.invoke(client, method, args).map_err(map_invoke)?;
        sdk::await_task(&self.bridge, task, method).await
    }

    async fn call_task_string(&self, client: &Handle, method: &str) -> Result<String> {
        let value = self.call_task(client, method, Vec::new()).await?;
        let actual = value.type_label();
        value.into_string().ok_or_else(|| {
            WalletError::provider_error(None, format!("{method} resolved with {actual}"))
        })
    }

    fn read_token(&self, token: &Handle) -> Result<TokenRecord> {
        let bridge = &self.bridge;
        let issuer_token_id = sdk::get_str(bridge, token, "getIssuerTokenId")?;
        Ok(TokenRecord {
            token_reference_id: issuer_token_id.clone(),
            issuer_token_id: Some(issuer_token_id),
            fpan_last_digits: sdk::get_opt_str(bridge, token, "getFpanLastFour")?.unwrap_or_default(),
            dpan_last_digits: sdk::get_opt_str(bridge, token, "getDpanLastFour")?,
            issuer_name: sdk::get_opt_str(bridge, token, "getIssuerName")?.unwrap_or_default(),
            network: sdk::card_network(sdk::get_int(bridge, token, "getNetwork")?),
            state: sdk::token_state(sdk::get_int(bridge, token, "getTokenState")?),
            is_default: sdk::get_bool(bridge, token, "getIsDefaultToken")?,
        })
    }

    fn user_address(&self, request: &ProvisionRequest) -> Result<Handle> {
        let address = &request.billing_address;
        let mut steps = vec![
            ("setName", Value::from(address.name.as_str())),
            ("setAddress1", Value::from(address.address_line1.as_str())),
        ];
        if let Some(line2) = &address.address_line2 {
            steps.push(("setAddress2", Value::from(line2.as_str())));
        }
        steps.push(("setLocality", Value::from(address.locality.as_str())));
        if let Some(area) = &address.administrative_area {
            steps.push(("setAdministrativeArea", Value::from(area.as_str())));
        }
        steps.push(("setCountryCode", Value::from(address.country_code.as_str())));
        steps.push(("setPostalCode", Value::from(address.postal_code.as_str())));
        if let Some(phone) = &address.phone_number {
            steps.push(("setPhoneNumber", Value::from(phone.as_str())));
        }

        self.bridge
            .build(sdk::USER_ADDRESS_BUILDER, steps)
            .map_err(map_invoke)
    }
}

#[async_trait]
impl WalletAdapter for GooglePayAdapter {
    fn provider(&self) -> ProviderIdentity {
        PROVIDER
    }

    fn variant(&self) -> AdapterVariant {
        AdapterVariant::Real
    }

    #[instrument(skip(self, context))]
    fn initialize(&self, context: HostContext) -> Result<()> {
        self.bridge
            .require(PROVIDER.marker_class())
            .map_err(|e| WalletError::from_invoke(PROVIDER, e))?;

        let activity = context.activity().cloned().ok_or_else(|| {
            WalletError::not_initialized(PROVIDER, "host context has no activity")
        })?;
        let client = self
            .bridge
            .invoke_static(sdk::TAP_AND_PAY, "getClient", vec![Value::Object(activity.clone())])
            .map_err(map_invoke)
            .and_then(|v| sdk::expect_object(v, "TapAndPay.getClient"))?;

        let session = Session {
            activity: Value::Object(activity),
            client,
        };
        *self.session.write() = Some(session);
        info!("Google Pay client ready");
        Ok(())
    }

    async fn check_availability(&self) -> bool {
        self.bridge.has_class(PROVIDER.marker_class())
    }

    #[instrument(skip(self))]
    async fn get_wallet_identity(&self) -> Result<WalletIdentity> {
        let session = self.session()?;
        let wallet_account_id = self
            .call_task_string(&session.client, "getActiveWalletId")
            .await?;
        let device_id = self
            .call_task_string(&session.client, "getStableHardwareId")
            .await?;
        Ok(WalletIdentity {
            device_id,
            wallet_account_id,
        })
    }

    #[instrument(skip(self), fields(id = %reference.id))]
    async fn get_credential_status(
        &self,
        reference: &CredentialReference,
    ) -> Result<CredentialStatus> {
        check_reference(reference)?;
        let network = reference.network.ok_or_else(|| {
            WalletError::InvalidInput("Google Pay token lookups need the card network".to_string())
        })?;
        let session = self.session()?;
        let tsp = self.token_provider(network)?;

        let status = self
            .call_task(
                &session.client,
                "getTokenStatus",
                vec![Value::Int(tsp), Value::from(reference.id.as_str())],
            )
            .await
            .and_then(|v| sdk::expect_object(v, "getTokenStatus"))?;

        Ok(CredentialStatus {
            state: sdk::token_state(sdk::get_int(&self.bridge, &status, "getTokenState")?),
            is_selected: sdk::get_bool(&self.bridge, &status, "isSelected")?,
        })
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

    #[instrument(skip(self))]
    async fn list_tokens(&self) -> Result<Vec<TokenRecord>> {
        let session = self.session()?;
        let listed = self.call_task(&session.client, "listTokens", Vec::new()).await?;
        let Some(items) = listed.into_list() else {
            return Ok(Vec::new());
        };

        let tokens = items
            .into_iter()
            .filter_map(Value::into_object)
            .map(|token| self.read_token(&token))
            .collect::<Result<Vec<_>>>()?;
        debug!(count = tokens.len(), "Listed Google Pay tokens");
        Ok(tokens)
    }

    #[instrument(skip(self, request), fields(network = ?request.network))]
    async fn provision_credential(&self, request: ProvisionRequest) -> Result<String> {
        request.validate()?;
        let session = self.session()?;

        let network_code = self.constant_int(&format!("CARD_NETWORK_{}", request.network.key()))?;
        let tsp = self.token_provider(request.network)?;
        let address = self.user_address(&request)?;
        let push_request = self
            .bridge
            .build(
                sdk::PUSH_TOKENIZE_REQUEST_BUILDER,
                [
                    ("setOpaquePaymentCard", Value::Bytes(request.opaque_card.into_bytes())),
                    ("setNetwork", Value::Int(network_code)),
                    ("setTokenServiceProvider", Value::Int(tsp)),
                    ("setDisplayName", Value::from(request.issuer.display_name)),
                    ("setLastDigits", Value::from(request.issuer.last_digits)),
                    ("setUserAddress", Value::Object(address)),
                ],
            )
            .map_err(map_invoke)?;

        let extra_key = self.constant_str("EXTRA_ISSUER_TOKEN_ID")?;
        let pending = self.correlator.launch(
            operation_code::PUSH_TOKENIZE,
            move |result: &ActivityResult| {
                result
                    .extra(&extra_key)
                    .filter(|id| !id.trim().is_empty())
                    .map(str::to_string)
                    .ok_or_else(|| {
                        WalletError::provider_error(
                            None,
                            "Push tokenize result has no issuer token id",
                        )
                    })
            },
            || {
                self.bridge
                    .invoke(
                        &session.client,
                        "pushTokenize",
                        vec![
                            session.activity.clone(),
                            Value::Object(push_request),
                            Value::from(operation_code::PUSH_TOKENIZE),
                        ],
                    )
                    .map(|_| ())
                    .map_err(map_invoke)
            },
        )?;

        info!("Push tokenize flow launched");
        pending.await
    }

    #[instrument(skip(self))]
    async fn create_wallet_if_needed(&self) -> Result<bool> {
        let session = self.session()?;
        match self.call_task_string(&session.client, "getActiveWalletId").await {
            Ok(_) => return Ok(false),
            Err(WalletError::NoActiveWallet) => {}
            Err(e) => return Err(e),
        }

        info!("No active wallet; launching wallet creation");
        let pending = self.correlator.launch(
            operation_code::CREATE_WALLET,
            |_: &ActivityResult| Ok(true),
            || {
                self.bridge
                    .invoke(
                        &session.client,
                        "createWallet",
                        vec![
                            session.activity.clone(),
                            Value::from(operation_code::CREATE_WALLET),
                        ],
                    )
                    .map(|_| ())
                    .map_err(map_invoke)
            },
        )?;
        pending.await
    }

    #[instrument(skip(self), fields(id = %reference.id))]
    async fn view_token(&self, reference: &CredentialReference) -> Result<()> {
        check_reference(reference)?;
        let network = reference.network.ok_or_else(|| {
            WalletError::InvalidInput("Google Pay token lookups need the card network".to_string())
        })?;
        let session = self.session()?;
        let tsp = self.token_provider(network)?;

        let view_request = self
            .bridge
            .build(
                sdk::VIEW_TOKEN_REQUEST_BUILDER,
                [
                    ("setIssuerTokenId", Value::from(reference.id.as_str())),
                    ("setTokenServiceProvider", Value::Int(tsp)),
                ],
            )
            .map_err(map_invoke)?;

        let pending = self.correlator.launch(
            operation_code::VIEW_TOKEN,
            |_: &ActivityResult| Ok(()),
            || {
                self.bridge
                    .invoke(
                        &session.client,
                        "viewToken",
                        vec![
                            session.activity.clone(),
                            Value::Object(view_request),
                            Value::from(operation_code::VIEW_TOKEN),
                        ],
                    )
                    .map(|_| ())
                    .map_err(map_invoke)
            },
        )?;
        pending.await
    }

    async fn request_default_nfc_payment(&self) -> Result<bool> {
        self.session()?;
        let pending = self.correlator.launch(
            operation_code::SET_DEFAULT_PAYMENTS,
            |_: &ActivityResult| Ok(true),
            || {
                self.host
                    .start_for_result(default_payment_intent(), operation_code::SET_DEFAULT_PAYMENTS)
                    .map_err(|e| WalletError::from_host(PROVIDER, e))
            },
        )?;
        pending.await
    }

    fn get_constants(&self) -> Constants {
        GOOGLE_PAY_CONSTANTS.resolve_with(|spec| {
            self.bridge
                .get_static(spec.class, spec.field)
                .ok()
                .and_then(|v| ConstantValue::from_native(&v))
        })
    }

    fn on_host_result(&self, result: &ActivityResult) -> bool {
        self.correlator.complete(result)
    }

    fn classifier(&self) -> Arc<dyn MessageClassifier> {
        self.classifier.clone()
    }
}

impl std::fmt::Debug for GooglePayAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GooglePayAdapter")
            .field("correlator", &self.correlator)
            .field("initialized", &self.session().is_ok())
            .finish()
    }
}
