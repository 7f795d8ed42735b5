//! Cross-module scenarios: selection, stub behaviour, routing and settling.

use bridge_traits::{ActivityResult, InboundEnvelope, LaunchMode};
use core_invoke::{DynClass, NativeRuntime};
use core_wallet::constants::{GOOGLE_PAY_CONSTANTS, SAMSUNG_PAY_CONSTANTS};
use core_wallet::{
    operation_code, AdapterVariant, BillingAddress, CapabilityProber, CardNetwork,
    ImplementationSelector, IssuerFields, MessageClassifier, MessageRouter, OperationCorrelator,
    ProviderIdentity, ProvisionRequest, RouteOutcome, StubAdapter, WalletAdapter, WalletError,
};
use std::sync::Arc;

fn provision_request() -> ProvisionRequest {
    ProvisionRequest {
        opaque_card: "ZW5jcnlwdGVkLWNhcmQ=".to_string(),
        network: CardNetwork::Mastercard,
        billing_address: BillingAddress {
            name: "Sam Smith".to_string(),
            address_line1: "5 Harbour Rd".to_string(),
            address_line2: None,
            locality: "Portsmouth".to_string(),
            administrative_area: None,
            country_code: "GB".to_string(),
            postal_code: "PO1 3AX".to_string(),
            phone_number: Some("+441234567890".to_string()),
        },
        issuer: IssuerFields {
            display_name: "Travel Card".to_string(),
            last_digits: "4444".to_string(),
        },
    }
}

#[tokio::test]
async fn absent_sdk_without_force_mock_selects_stub_and_rejects_provisioning() {
    let runtime = Arc::new(NativeRuntime::new());
    let selector = ImplementationSelector::new(Arc::new(CapabilityProber::new(runtime)));

    let variant = selector.select(ProviderIdentity::SamsungPay);
    assert_eq!(variant, AdapterVariant::Stub);

    let adapter = StubAdapter::new(ProviderIdentity::SamsungPay);
    let err = adapter
        .provision_credential(provision_request())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        WalletError::CapabilityUnavailable {
            provider: ProviderIdentity::SamsungPay
        }
    );
}

#[test]
fn linked_sdk_selects_real() {
    let runtime = Arc::new(NativeRuntime::new());
    runtime.register_class(Arc::new(DynClass::new(
        ProviderIdentity::GooglePay.marker_class(),
    )));
    let selector = ImplementationSelector::new(Arc::new(CapabilityProber::new(runtime)));
    assert_eq!(selector.select(ProviderIdentity::GooglePay), AdapterVariant::Real);
}

#[test]
fn stub_constants_cover_the_schema_keys() {
    for (provider, schema) in [
        (ProviderIdentity::GooglePay, GOOGLE_PAY_CONSTANTS),
        (ProviderIdentity::SamsungPay, SAMSUNG_PAY_CONSTANTS),
    ] {
        let stub = StubAdapter::new(provider).get_constants();
        let documented = schema.fallbacks();
        assert!(stub.keys().eq(documented.keys()), "{provider} keys differ");
    }
}

struct AllowList {
    provider: ProviderIdentity,
    sender: &'static str,
    suffix: &'static str,
}

impl MessageClassifier for AllowList {
    fn provider(&self) -> ProviderIdentity {
        self.provider
    }

    fn is_valid_sender(&self, sender: Option<&str>) -> bool {
        sender == Some(self.sender)
    }

    fn is_relevant_action(&self, action: &str) -> bool {
        action.ends_with(self.suffix)
    }
}

#[test]
fn message_before_listener_is_buffered_for_its_provider() {
    let router = MessageRouter::new(vec![
        Arc::new(AllowList {
            provider: ProviderIdentity::GooglePay,
            sender: "providerA.pkg",
            suffix: "ACTIVATE_TOKEN",
        }),
        Arc::new(AllowList {
            provider: ProviderIdentity::SamsungPay,
            sender: "providerB.pkg",
            suffix: "LAUNCH_A2A_IDV",
        }),
    ]);

    let envelope = InboundEnvelope::new("X.ACTIVATE_TOKEN")
        .with_sender("providerA.pkg")
        .with_payload("eyJ0b2tlbiI6IjEyMyJ9");
    let decision = router.route(envelope.clone(), LaunchMode::Standard);
    assert_eq!(decision.outcome, RouteOutcome::Claimed(ProviderIdentity::GooglePay));

    router.register_listener(ProviderIdentity::GooglePay);
    let drained = router.drain_pending(ProviderIdentity::GooglePay).unwrap();
    assert_eq!(drained.action, envelope.action);
    assert_eq!(drained.payload, envelope.payload);
    assert_eq!(drained.sender_identity, envelope.sender_identity);
    assert!(router.drain_pending(ProviderIdentity::SamsungPay).is_none());
}

#[tokio::test]
async fn provisioning_success_resolves_once() {
    let correlator = OperationCorrelator::new(ProviderIdentity::GooglePay);
    let pending = correlator.arm(operation_code::PUSH_TOKENIZE, |result| {
        result
            .extra("extra_issuer_token_id")
            .map(str::to_string)
            .ok_or_else(|| WalletError::provider_error(None, "missing id"))
    });

    let success = ActivityResult::ok(operation_code::PUSH_TOKENIZE)
        .with_extra("extra_issuer_token_id", "issuer-token-1");
    assert!(correlator.complete(&success));
    assert!(!correlator.complete(
        &ActivityResult::ok(operation_code::PUSH_TOKENIZE)
            .with_extra("extra_issuer_token_id", "late")
    ));

    assert_eq!(pending.await.unwrap(), "issuer-token-1");
}

#[tokio::test]
async fn provisioning_cancellation_rejects_with_user_canceled() {
    let correlator = OperationCorrelator::new(ProviderIdentity::SamsungPay);
    let pending = correlator.arm(operation_code::PUSH_TOKENIZE, |_| Ok(String::new()));
    correlator.complete(&ActivityResult::canceled(operation_code::PUSH_TOKENIZE));
    assert_eq!(pending.await.unwrap_err(), WalletError::UserCanceled);
}
