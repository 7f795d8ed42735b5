//! Samsung Pay adapter over the Samsung Pay partner SDK.

use async_trait::async_trait;
use bridge_traits::{ActivityResult, HostContainer};
use core_invoke::{Callbacks, DynamicBridge, Handle, Value};
use core_runtime::config::ProviderSettings;
use core_runtime::events::EventBus;
use core_wallet::adapter::check_reference;
use core_wallet::constants::SAMSUNG_PAY_CONSTANTS;
use core_wallet::{
    default_payment_intent, operation_code, AdapterVariant, AllowListClassifier, CardRecord,
    ConstantValue, Constants, CredentialReference, CredentialStatus, HostContext,
    MessageClassifier, OperationCorrelator, ProviderIdentity, ProvisionRequest, Result,
    TokenRecord, WalletAdapter, WalletError, WalletIdentity,
};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::classifier::classifier;
use crate::sdk::{self, fail_error, map_invoke, Completion, SamsungCard};

const PROVIDER: ProviderIdentity = ProviderIdentity::SamsungPay;

#[derive(Clone)]
struct Session {
    samsung_pay: Handle,
    card_manager: Handle,
}

/// Status reported by `getSamsungPayStatus`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PayStatus {
    code: i64,
    extras: BTreeMap<String, String>,
}

/// Real Samsung Pay adapter.
///
/// Needs the partner service id issued by Samsung; without it `initialize`
/// fails with `NotInitialized`. Card operations complete through SDK
/// listeners; only the default payment app request goes through the host.
pub struct SamsungPayAdapter {
    bridge: DynamicBridge,
    host: Arc<dyn HostContainer>,
    service_id: Option<String>,
    correlator: OperationCorrelator,
    session: RwLock<Option<Session>>,
    classifier: Arc<AllowListClassifier>,
}

impl SamsungPayAdapter {
    pub fn new(
        bridge: DynamicBridge,
        host: Arc<dyn HostContainer>,
        settings: &ProviderSettings,
        service_id: Option<String>,
    ) -> Self {
        Self {
            bridge,
            host,
            service_id,
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

    fn constant_str(&self, key: &str) -> Result<String> {
        let spec = SAMSUNG_PAY_CONSTANTS
            .spec(key)
            .ok_or_else(|| WalletError::provider_error(None, format!("Unknown constant {key}")))?;
        let value = self
            .bridge
            .get_static(spec.class, spec.field)
            .ok()
            .and_then(|v| ConstantValue::from_native(&v))
            .and_then(|v| v.as_str().map(str::to_string));
        value
            .or_else(|| SAMSUNG_PAY_CONSTANTS.str(key).map(str::to_string))
            .ok_or_else(|| WalletError::provider_error(None, format!("Constant {key} is not a string")))
    }

    /// Register a status listener and wait for its first answer.
    async fn status_call(
        &self,
        target: &Handle,
        method: &str,
        mut args: Vec<Value>,
    ) -> Result<PayStatus> {
        let (done, rx) = Completion::new();
        let success = done.clone();
        let operation = method.to_string();
        let callbacks = Callbacks::new()
            .on("onSuccess", move |args| {
                success.settle(Ok(PayStatus {
                    code: args.first().and_then(Value::as_i64).unwrap_or(sdk::SPAY_NOT_SUPPORTED),
                    extras: sdk::bundle(args.get(1)),
                }));
                Value::Null
            })
            .on("onFail", move |args| {
                done.settle(Err(fail_error(&args, &operation)));
                Value::Null
            });

        let listener = self
            .bridge
            .make_callback_proxy(sdk::STATUS_LISTENER, callbacks)
            .map_err(map_invoke)?;
        args.push(Value::Object(listener));
        self.bridge.invoke(target, method, args).map_err(map_invoke)?;
        sdk::wait(rx, method).await
    }

    async fn pay_status(&self, session: &Session) -> Result<PayStatus> {
        self.status_call(&session.samsung_pay, "getSamsungPayStatus", Vec::new())
            .await
    }

    async fn all_cards(&self, session: &Session) -> Result<Vec<SamsungCard>> {
        let (done, rx) = Completion::new();
        let success = done.clone();
        let reader = self.bridge.clone();
        let callbacks = Callbacks::new()
            .on("onSuccess", move |args| {
                let cards = args
                    .into_iter()
                    .next()
                    .and_then(Value::into_list)
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(Value::into_object)
                    .map(|card| SamsungCard::read(&reader, &card))
                    .collect::<Result<Vec<_>>>();
                success.settle(cards);
                Value::Null
            })
            .on("onFail", move |args| {
                done.settle(Err(fail_error(&args, "getAllCards")));
                Value::Null
            });

        let listener = self
            .bridge
            .make_callback_proxy(sdk::GET_CARD_LISTENER, callbacks)
            .map_err(map_invoke)?;
        self.bridge
            .invoke(
                &session.card_manager,
                "getAllCards",
                vec![Value::Map(BTreeMap::new()), Value::Object(listener)],
            )
            .map_err(map_invoke)?;

        let cards = sdk::wait(rx, "getAllCards").await?;
        debug!(count = cards.len(), "Listed Samsung Pay cards");
        Ok(cards)
    }
}

#[async_trait]
impl WalletAdapter for SamsungPayAdapter {
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
            .map_err(map_invoke)?;

        let service_id = self
            .service_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| {
                WalletError::not_initialized(PROVIDER, "no Samsung Pay partner service id configured")
            })?;
        let activity = context.activity().cloned().ok_or_else(|| {
            WalletError::not_initialized(PROVIDER, "host context has no activity")
        })?;

        let mut partner_data = BTreeMap::new();
        partner_data.insert(
            sdk::PARTNER_SERVICE_TYPE.to_string(),
            Value::from(sdk::SERVICE_TYPE_APP2APP),
        );
        let partner_info = self
            .bridge
            .instantiate(
                sdk::PARTNER_INFO,
                vec![Value::from(service_id), Value::Map(partner_data)],
            )
            .map_err(map_invoke)?;

        let args = vec![Value::Object(activity), Value::Object(partner_info)];
        let samsung_pay = self
            .bridge
            .instantiate(sdk::SAMSUNG_PAY, args.clone())
            .map_err(map_invoke)?;
        let card_manager = self
            .bridge
            .instantiate(sdk::CARD_MANAGER, args)
            .map_err(map_invoke)?;

        let session = Session {
            samsung_pay,
            card_manager,
        };
        *self.session.write() = Some(session);
        info!("Samsung Pay partner session ready");
        Ok(())
    }

    async fn check_availability(&self) -> bool {
        let Ok(session) = self.session() else {
            return false;
        };
        match self.pay_status(&session).await {
            Ok(status) => status.code == sdk::SPAY_READY,
            Err(e) => {
                warn!(error = %e, "Samsung Pay status check failed");
                false
            }
        }
    }

    #[instrument(skip(self))]
    async fn get_wallet_identity(&self) -> Result<WalletIdentity> {
        let session = self.session()?;
        let keys = Value::List(vec![
            Value::from(sdk::WALLET_DEVICE_ID),
            Value::from(sdk::WALLET_USER_ID),
        ]);
        let info = self
            .status_call(&session.samsung_pay, "getWalletInfo", vec![keys])
            .await?;

        let field = |key: &str| {
            info.extras.get(key).cloned().ok_or_else(|| {
                WalletError::provider_error(None, format!("Wallet info is missing {key}"))
            })
        };
        Ok(WalletIdentity {
            device_id: field(sdk::WALLET_DEVICE_ID)?,
            wallet_account_id: field(sdk::WALLET_USER_ID)?,
        })
    }

    #[instrument(skip(self), fields(id = %reference.id))]
    async fn get_credential_status(
        &self,
        reference: &CredentialReference,
    ) -> Result<CredentialStatus> {
        check_reference(reference)?;
        let session = self.session()?;
        let cards = self.all_cards(&session).await?;
        cards
            .into_iter()
            .find(|card| card.card_id == reference.id)
            .map(|card| CredentialStatus {
                state: card.state,
                is_selected: false,
            })
            .ok_or_else(|| WalletError::NotFound(format!("Card {} is not in Samsung Pay", reference.id)))
    }

    async fn list_credentials(&self) -> Result<Vec<CardRecord>> {
        let session = self.session()?;
        let cards = self.all_cards(&session).await?;
        Ok(cards
            .into_iter()
            .map(|card| CardRecord {
                last_digits: card.info("last4FPan").unwrap_or_default().to_string(),
                display_name: card.info("cardName").unwrap_or_default().to_string(),
                issuer_name: card.info("issuerName").unwrap_or_default().to_string(),
                identifier: card.card_id,
                network: card.network,
                state: card.state,
                is_default: false,
            })
            .collect())
    }

    async fn list_tokens(&self) -> Result<Vec<TokenRecord>> {
        let session = self.session()?;
        let cards = self.all_cards(&session).await?;
        Ok(cards
            .into_iter()
            .map(|card| TokenRecord {
                fpan_last_digits: card.info("last4FPan").unwrap_or_default().to_string(),
                dpan_last_digits: card.info("last4DPan").map(str::to_string),
                issuer_name: card.info("issuerName").unwrap_or_default().to_string(),
                token_reference_id: card.card_id,
                issuer_token_id: None,
                network: card.network,
                state: card.state,
                is_default: false,
            })
            .collect())
    }

    #[instrument(skip(self, request), fields(network = ?request.network))]
    async fn provision_credential(&self, request: ProvisionRequest) -> Result<String> {
        request.validate()?;
        let session = self.session()?;

        let provider_code = self.constant_str(&sdk::provider_key(request.network)?)?;
        let card_type = self.constant_str("CARD_TYPE_PAYMENT")?;
        let payload_key = self.constant_str("EXTRA_PROVISION_PAYLOAD")?;

        let mut card_detail = BTreeMap::new();
        card_detail.insert(payload_key, Value::from(request.opaque_card));
        let card_info = self
            .bridge
            .instantiate(
                sdk::ADD_CARD_INFO,
                vec![
                    Value::from(card_type),
                    Value::from(provider_code),
                    Value::Map(card_detail),
                ],
            )
            .map_err(map_invoke)?;

        let (done, rx) = Completion::new();
        let success = done.clone();
        let reader = self.bridge.clone();
        let callbacks = Callbacks::new()
            .on("onSuccess", move |args| {
                let card = args
                    .get(1)
                    .and_then(Value::as_object)
                    .ok_or_else(|| WalletError::provider_error(None, "addCard succeeded without a card"))
                    .and_then(|card| SamsungCard::read(&reader, card))
                    .map(|card| card.card_id);
                success.settle(card);
                Value::Null
            })
            .on("onFail", move |args| {
                done.settle(Err(fail_error(&args, "addCard")));
                Value::Null
            });

        let listener = self
            .bridge
            .make_callback_proxy(sdk::ADD_CARD_LISTENER, callbacks)
            .map_err(map_invoke)?;
        self.bridge
            .invoke(
                &session.card_manager,
                "addCard",
                vec![Value::Object(card_info), Value::Object(listener)],
            )
            .map_err(map_invoke)?;

        info!("Samsung Pay add card flow started");
        sdk::wait(rx, "addCard").await
    }

    /// Samsung Pay cannot create a wallet for the user; when it is not set
    /// up yet the user is sent to its activation screen.
    #[instrument(skip(self))]
    async fn create_wallet_if_needed(&self) -> Result<bool> {
        let session = self.session()?;
        let status = self.pay_status(&session).await?;

        match status.code {
            sdk::SPAY_READY => Ok(false),
            sdk::SPAY_NOT_READY => {
                let reason = status
                    .extras
                    .get(sdk::EXTRA_ERROR_REASON)
                    .and_then(|r| r.parse::<i64>().ok());
                if reason == Some(sdk::ERROR_SPAY_APP_NEED_TO_UPDATE) {
                    self.bridge
                        .invoke(&session.samsung_pay, "goToUpdatePage", Vec::new())
                        .map_err(map_invoke)?;
                    return Err(WalletError::provider_error(
                        Some(sdk::ERROR_SPAY_APP_NEED_TO_UPDATE as i32),
                        "Samsung Pay must be updated first",
                    ));
                }

                self.bridge
                    .invoke(&session.samsung_pay, "activateSamsungPay", Vec::new())
                    .map_err(map_invoke)?;
                info!("Samsung Pay activation launched");
                Ok(true)
            }
            code => Err(WalletError::provider_error(
                i32::try_from(code).ok(),
                "Samsung Pay is not supported on this device",
            )),
        }
    }

    async fn view_token(&self, reference: &CredentialReference) -> Result<()> {
        check_reference(reference)?;
        self.session()?;
        Err(WalletError::provider_error(
            None,
            "Samsung Pay has no token details screen",
        ))
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
        SAMSUNG_PAY_CONSTANTS.resolve_with(|spec| {
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

impl std::fmt::Debug for SamsungPayAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SamsungPayAdapter")
            .field("has_service_id", &self.service_id.is_some())
            .field("correlator", &self.correlator)
            .field("initialized", &self.session().is_ok())
            .finish()
    }
}
