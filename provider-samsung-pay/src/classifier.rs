//! Inbound message policy for Samsung Pay app-to-app identity verification.

use core_runtime::config::ProviderSettings;
use core_wallet::{AllowListClassifier, ProviderIdentity};

pub fn classifier(settings: &ProviderSettings) -> AllowListClassifier {
    AllowListClassifier::new(ProviderIdentity::SamsungPay, settings).with_decoder(decode_idv_payload)
}

pub fn mock_classifier(settings: &ProviderSettings) -> AllowListClassifier {
    classifier(settings).accepting_any_sender()
}

/// Samsung Pay sends the verification payload as plain JSON.
pub fn decode_idv_payload(payload: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(payload).ok()?;
    serde_json::to_string(&json).ok()
}
