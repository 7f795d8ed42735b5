//! Inbound message policy for Google Pay app-to-app activation.
//!
//! Google Pay launches the issuer app with an action ending in
//! `ACTIVATE_TOKEN` and a base64 (standard alphabet) JSON payload carrying
//! the activation parameters.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use core_runtime::config::ProviderSettings;
use core_wallet::{AllowListClassifier, ProviderIdentity};

/// Classifier used by the Real adapter: senders must be on the allow-list.
pub fn classifier(settings: &ProviderSettings) -> AllowListClassifier {
    AllowListClassifier::new(ProviderIdentity::GooglePay, settings)
        .with_decoder(decode_activation_params)
}

/// Classifier used by the Mock adapter: any non-empty sender is accepted so
/// test apps can drive the flow.
pub fn mock_classifier(settings: &ProviderSettings) -> AllowListClassifier {
    classifier(settings).accepting_any_sender()
}

/// Decode a base64 JSON activation payload into compact JSON text.
pub fn decode_activation_params(payload: &str) -> Option<String> {
    let bytes = STANDARD.decode(payload.trim()).ok()?;
    let json: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    serde_json::to_string(&json).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_wallet::MessageClassifier;

    #[test]
    fn test_decode_activation_params() {
        // {"token":"123"}
        assert_eq!(
            decode_activation_params("eyJ0b2tlbiI6IjEyMyJ9"),
            Some(r#"{"token":"123"}"#.to_string())
        );
        assert_eq!(decode_activation_params("not base64!"), None);
        // "plain text" in base64 is not JSON
        assert_eq!(decode_activation_params("cGxhaW4gdGV4dA=="), None);
    }

    #[test]
    fn test_real_classifier_checks_sender() {
        let classifier = classifier(&ProviderSettings::google_pay());
        assert!(classifier.claims("com.issuer.ACTIVATE_TOKEN", Some("com.google.android.gms")));
        assert!(!classifier.claims("com.issuer.ACTIVATE_TOKEN", Some("com.example.other")));
        assert!(!classifier.claims("com.issuer.LAUNCH_A2A_IDV", Some("com.google.android.gms")));
        assert!(!classifier.claims("com.issuer.ACTIVATE_TOKEN", None));
    }

    #[test]
    fn test_mock_classifier_accepts_any_sender() {
        let classifier = mock_classifier(&ProviderSettings::google_pay());
        assert!(classifier.claims("com.issuer.ACTIVATE_TOKEN", Some("com.example.tester")));
        assert!(!classifier.claims("com.issuer.ACTIVATE_TOKEN", None));
        assert_eq!(
            classifier.decode_payload("eyJ0b2tlbiI6IjEyMyJ9").as_deref(),
            Some(r#"{"token":"123"}"#)
        );
    }
}
