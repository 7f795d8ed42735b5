//! Real Samsung Pay adapter against a fake partner SDK.

use bridge_traits::{ActivityResult, HostContainer, HostIntent, InboundEnvelope};
use core_invoke::{
    DynClass, DynObject, DynamicBridge, Handle, InterfaceDecl, NativeFault, NativeRuntime, Value,
};
use core_runtime::config::ProviderSettings;
use core_wallet::{
    operation_code, BillingAddress, CardNetwork, ConstantValue, CredentialReference, CredentialState, HostContext,
    IssuerFields, ProviderIdentity, ProvisionRequest, StubAdapter, WalletAdapter, WalletError,
};
use mockall::mock;
use provider_samsung_pay::sdk::{
    ADD_CARD_INFO, ADD_CARD_LISTENER, CARD_MANAGER, GET_CARD_LISTENER, PARTNER_INFO, SAMSUNG_PAY,
    STATUS_LISTENER,
};
use provider_samsung_pay::SamsungPayAdapter;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

mock! {
    Host {}

    impl HostContainer for Host {
        fn start_for_result(&self, intent: HostIntent, request_code: i32) -> bridge_traits::error::Result<()>;
        fn relaunch(&self, envelope: InboundEnvelope) -> bridge_traits::error::Result<()>;
        fn is_attached(&self) -> bool;
    }
}

/// Knobs and recordings of the fake SDK.
struct FakeSpay {
    status: Mutex<i64>,
    status_extras: Mutex<BTreeMap<String, Value>>,
    add_card_fail: Mutex<Option<i64>>,
    service_ids: Mutex<Vec<String>>,
    card_infos: Mutex<Vec<Vec<Value>>>,
    activations: Mutex<usize>,
}

impl Default for FakeSpay {
    fn default() -> Self {
        Self {
            status: Mutex::new(2),
            status_extras: Mutex::new(BTreeMap::new()),
            add_card_fail: Mutex::new(None),
            service_ids: Mutex::new(Vec::new()),
            card_infos: Mutex::new(Vec::new()),
            activations: Mutex::new(0),
        }
    }
}

fn call_back(listener: &Value, method: &str, args: Vec<Value>) -> Result<(), NativeFault> {
    let listener = listener
        .as_object()
        .ok_or_else(|| NativeFault::new("listener required"))?;
    let index = listener
        .methods()
        .iter()
        .position(|m| m.name == method && m.arity == args.len())
        .ok_or_else(|| NativeFault::new(format!("listener has no {method}")))?;
    listener.call(index, args).map(|_| ())
}

fn card(id: &str, status: &str, brand: &str, last4: &str) -> Value {
    let (id, status, brand) = (id.to_string(), status.to_string(), brand.to_string());
    let mut info = BTreeMap::new();
    info.insert("last4FPan".to_string(), Value::from(last4));
    info.insert("last4DPan".to_string(), Value::from("9999"));
    info.insert("issuerName".to_string(), Value::from("Fake Bank"));
    info.insert("cardName".to_string(), Value::from("Fake Card"));

    Value::Object(
        DynObject::new("com.samsung.android.sdk.samsungpay.v2.card.Card")
            .method("getCardId", 0, move |_| Ok(Value::from(id.clone())))
            .method("getCardStatus", 0, move |_| Ok(Value::from(status.clone())))
            .method("getCardBrand", 0, move |_| Ok(Value::from(brand.clone())))
            .method("getCardInfo", 0, move |_| Ok(Value::Map(info.clone())))
            .into_handle(),
    )
}

fn runtime(fake: Arc<FakeSpay>) -> Arc<NativeRuntime> {
    let runtime = Arc::new(NativeRuntime::new());

    let partner = Arc::clone(&fake);
    runtime.register_class(Arc::new(DynClass::new(PARTNER_INFO).constructor(2, move |args| {
        partner
            .service_ids
            .lock()
            .unwrap()
            .push(args[0].as_str().unwrap_or_default().to_string());
        Ok(DynObject::new(PARTNER_INFO).into_handle())
    })));

    let spay = Arc::clone(&fake);
    runtime.register_class(Arc::new(
        DynClass::new(SAMSUNG_PAY)
            .static_field("SPAY_READY", 2)
            .constructor(2, move |_| {
                let status = Arc::clone(&spay);
                let activate = Arc::clone(&spay);
                Ok(DynObject::new(SAMSUNG_PAY)
                    .method("getSamsungPayStatus", 1, move |args| {
                        let code = *status.status.lock().unwrap();
                        let extras = status.status_extras.lock().unwrap().clone();
                        call_back(&args[0], "onSuccess", vec![Value::Int(code), Value::Map(extras)])?;
                        Ok(Value::Null)
                    })
                    .method("getWalletInfo", 2, |args| {
                        let mut info = BTreeMap::new();
                        info.insert("deviceId".to_string(), Value::from("spay-device"));
                        info.insert("walletUserId".to_string(), Value::from("spay-user"));
                        call_back(&args[1], "onSuccess", vec![Value::from(0), Value::Map(info)])?;
                        Ok(Value::Null)
                    })
                    .method("activateSamsungPay", 0, move |_| {
                        *activate.activations.lock().unwrap() += 1;
                        Ok(Value::Null)
                    })
                    .method("goToUpdatePage", 0, |_| Ok(Value::Null))
                    .into_handle())
            }),
    ));

    let manager = Arc::clone(&fake);
    runtime.register_class(Arc::new(DynClass::new(CARD_MANAGER).constructor(2, move |_| {
        let adds = Arc::clone(&manager);
        Ok(DynObject::new(CARD_MANAGER)
            .method("getAllCards", 2, |args| {
                let cards = vec![
                    card("card-1", "ACTIVE", "VI", "1111"),
                    card("card-2", "PENDING_PROVISION", "MC", "2222"),
                ];
                call_back(&args[1], "onSuccess", vec![Value::List(cards)])?;
                Ok(Value::Null)
            })
            .method("addCard", 2, move |args| {
                let info = args[0].as_object().ok_or_else(|| NativeFault::new("AddCardInfo required"))?;
                let fields = info.call(0, Vec::new())?;
                adds.card_infos
                    .lock()
                    .unwrap()
                    .push(fields.into_list().unwrap_or_default());

                match *adds.add_card_fail.lock().unwrap() {
                    Some(code) => call_back(&args[1], "onFail", vec![Value::Int(code), Value::Null])?,
                    None => call_back(
                        &args[1],
                        "onSuccess",
                        vec![Value::from(0), card("card-new", "PENDING_PROVISION", "VI", "4444")],
                    )?,
                }
                Ok(Value::Null)
            })
            .into_handle())
    })));

    runtime.register_class(Arc::new(DynClass::new(ADD_CARD_INFO).constructor(3, |args| {
        Ok(DynObject::new(ADD_CARD_INFO)
            .method("fields", 0, move |_| Ok(Value::List(args.clone())))
            .into_handle())
    })));

    runtime.register_interface(
        InterfaceDecl::new(STATUS_LISTENER)
            .method("onSuccess", 2)
            .method("onFail", 2),
    );
    runtime.register_interface(
        InterfaceDecl::new(GET_CARD_LISTENER)
            .method("onSuccess", 1)
            .method("onFail", 2),
    );
    runtime.register_interface(
        InterfaceDecl::new(ADD_CARD_LISTENER)
            .method("onSuccess", 2)
            .method("onFail", 2)
            .method("onProgress", 3),
    );
    runtime
}

fn activity() -> Handle {
    DynObject::new("android.app.Activity").into_handle()
}

fn adapter(fake: Arc<FakeSpay>, service_id: Option<&str>) -> SamsungPayAdapter {
    with_host(fake, service_id, MockHost::new())
}

fn with_host(fake: Arc<FakeSpay>, service_id: Option<&str>, host: MockHost) -> SamsungPayAdapter {
    SamsungPayAdapter::new(
        DynamicBridge::new(runtime(fake)),
        Arc::new(host),
        &ProviderSettings::samsung_pay(),
        service_id.map(str::to_string),
    )
}

fn ready(fake: Arc<FakeSpay>) -> SamsungPayAdapter {
    let adapter = adapter(fake, Some("partner-service-1"));
    adapter.initialize(HostContext::new(activity())).unwrap();
    adapter
}

fn provision_request(network: CardNetwork) -> ProvisionRequest {
    ProvisionRequest {
        opaque_card: "eyJlbmMiOiJ4In0=".to_string(),
        network,
        billing_address: BillingAddress {
            name: "Kim Park".to_string(),
            address_line1: "12 Gangnam-daero".to_string(),
            address_line2: None,
            locality: "Seoul".to_string(),
            administrative_area: None,
            country_code: "KR".to_string(),
            postal_code: "06000".to_string(),
            phone_number: None,
        },
        issuer: IssuerFields {
            display_name: "Seoul Card".to_string(),
            last_digits: "4444".to_string(),
        },
    }
}

#[test]
fn initialize_needs_service_id() {
    let fake = Arc::new(FakeSpay::default());
    let err = adapter(Arc::clone(&fake), None)
        .initialize(HostContext::new(activity()))
        .unwrap_err();
    assert!(matches!(err, WalletError::NotInitialized { .. }));

    ready(Arc::clone(&fake));
    assert_eq!(*fake.service_ids.lock().unwrap(), vec!["partner-service-1".to_string()]);
}

#[tokio::test]
async fn availability_follows_sdk_status() {
    let fake = Arc::new(FakeSpay::default());
    assert!(!adapter(Arc::clone(&fake), Some("svc")).check_availability().await);

    let adapter = ready(Arc::clone(&fake));
    assert!(adapter.check_availability().await);

    *fake.status.lock().unwrap() = 1;
    assert!(!adapter.check_availability().await);
}

#[tokio::test]
async fn wallet_identity_from_wallet_info() {
    let adapter = ready(Arc::new(FakeSpay::default()));
    let identity = adapter.get_wallet_identity().await.unwrap();
    assert_eq!(identity.device_id, "spay-device");
    assert_eq!(identity.wallet_account_id, "spay-user");
}

#[tokio::test]
async fn cards_are_read_through_listeners() {
    let adapter = ready(Arc::new(FakeSpay::default()));

    let cards = adapter.list_credentials().await.unwrap();
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0].identifier, "card-1");
    assert_eq!(cards[0].last_digits, "1111");
    assert_eq!(cards[0].network, Some(CardNetwork::Visa));
    assert_eq!(cards[1].state, CredentialState::Pending);

    let tokens = adapter.list_tokens().await.unwrap();
    assert_eq!(tokens[1].dpan_last_digits.as_deref(), Some("9999"));

    let status = adapter
        .get_credential_status(&CredentialReference::new("card-1"))
        .await
        .unwrap();
    assert_eq!(status.state, CredentialState::Active);

    let missing = adapter
        .get_credential_status(&CredentialReference::new("card-9"))
        .await
        .unwrap_err();
    assert_eq!(missing.code(), "NOT_FOUND");
}

#[tokio::test]
async fn add_card_success_returns_card_id() {
    let fake = Arc::new(FakeSpay::default());
    let adapter = ready(Arc::clone(&fake));

    let id = adapter
        .provision_credential(provision_request(CardNetwork::Visa))
        .await
        .unwrap();
    assert_eq!(id, "card-new");

    let infos = fake.card_infos.lock().unwrap().clone();
    assert_eq!(infos[0][0].as_str(), Some("PAYMENT"));
    assert_eq!(infos[0][1].as_str(), Some("VI"));
    let detail = infos[0][2].as_map().unwrap();
    assert_eq!(detail["provisionPayload"].as_str(), Some("eyJlbmMiOiJ4In0="));
}

#[tokio::test]
async fn add_card_failures_are_mapped() {
    let fake = Arc::new(FakeSpay::default());
    let adapter = ready(Arc::clone(&fake));

    *fake.add_card_fail.lock().unwrap() = Some(-7);
    assert_eq!(
        adapter
            .provision_credential(provision_request(CardNetwork::Mastercard))
            .await
            .unwrap_err(),
        WalletError::UserCanceled
    );

    *fake.add_card_fail.lock().unwrap() = Some(-356);
    assert_eq!(
        adapter
            .provision_credential(provision_request(CardNetwork::Mastercard))
            .await
            .unwrap_err(),
        WalletError::provider_error(Some(-356), "Samsung Pay addCard failed")
    );
}

#[tokio::test]
async fn unsupported_network_is_rejected_before_the_sdk() {
    let fake = Arc::new(FakeSpay::default());
    let adapter = ready(Arc::clone(&fake));
    assert_eq!(
        adapter
            .provision_credential(provision_request(CardNetwork::Elo))
            .await
            .unwrap_err()
            .code(),
        "INVALID_INPUT"
    );
    assert!(fake.card_infos.lock().unwrap().is_empty());
}

#[tokio::test]
async fn create_wallet_activates_when_not_ready() {
    let fake = Arc::new(FakeSpay::default());
    let adapter = ready(Arc::clone(&fake));
    assert!(!adapter.create_wallet_if_needed().await.unwrap());

    *fake.status.lock().unwrap() = 1;
    assert!(adapter.create_wallet_if_needed().await.unwrap());
    assert_eq!(*fake.activations.lock().unwrap(), 1);

    fake.status_extras
        .lock()
        .unwrap()
        .insert("errorReason".to_string(), Value::from("-357"));
    let err = adapter.create_wallet_if_needed().await.unwrap_err();
    assert_eq!(err, WalletError::provider_error(Some(-357), "Samsung Pay must be updated first"));
    assert_eq!(*fake.activations.lock().unwrap(), 1);

    *fake.status.lock().unwrap() = 0;
    assert_eq!(adapter.create_wallet_if_needed().await.unwrap_err().code(), "PROVIDER_ERROR");
}

#[tokio::test]
async fn view_token_is_not_supported() {
    let adapter = ready(Arc::new(FakeSpay::default()));
    assert_eq!(
        adapter
            .view_token(&CredentialReference::new("card-1"))
            .await
            .unwrap_err()
            .code(),
        "PROVIDER_ERROR"
    );
    assert_eq!(
        adapter.view_token(&CredentialReference::new("")).await.unwrap_err().code(),
        "INVALID_INPUT"
    );
}

#[test]
fn constants_read_sdk_fields_with_fallbacks() {
    let adapter = ready(Arc::new(FakeSpay::default()));
    let constants = adapter.get_constants();
    assert_eq!(constants["SPAY_READY"], ConstantValue::Int(2));
    assert_eq!(constants["ERROR_USER_CANCELED"], ConstantValue::Int(-7));
    assert_eq!(constants["PROVIDER_AMEX"], ConstantValue::Str("AX".to_string()));
}

#[test]
fn constant_keys_match_the_stub() {
    let adapter = ready(Arc::new(FakeSpay::default()));
    let stub = StubAdapter::new(ProviderIdentity::SamsungPay);
    assert!(adapter.get_constants().keys().eq(stub.get_constants().keys()));
}

#[tokio::test]
async fn canceled_default_payment_request() {
    let (tx, mut launched) = mpsc::unbounded_channel();
    let mut host = MockHost::new();
    host.expect_start_for_result()
        .withf(|_, code| *code == operation_code::SET_DEFAULT_PAYMENTS)
        .times(1)
        .returning(move |_, code| {
            tx.send(code).ok();
            Ok(())
        });

    let adapter = Arc::new(with_host(Arc::new(FakeSpay::default()), Some("svc"), host));
    adapter.initialize(HostContext::new(activity())).unwrap();

    let waiting = Arc::clone(&adapter);
    let pending = tokio::spawn(async move { waiting.request_default_nfc_payment().await });
    let code = launched.recv().await.unwrap();

    assert!(!adapter.on_host_result(&ActivityResult::ok(code + 1)));
    assert!(adapter.on_host_result(&ActivityResult::canceled(code)));
    assert_eq!(pending.await.unwrap().unwrap_err(), WalletError::UserCanceled);
}
