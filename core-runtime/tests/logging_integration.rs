//! Integration tests for logging system

use bridge_traits::LogLevel;
use core_runtime::logging::{mask_digits, redact_if_sensitive, LogFormat, LoggingConfig};

#[test]
fn test_logging_config() {
    // Only one global subscriber per process, so the builder is tested instead
    let config = LoggingConfig::default()
        .with_format(LogFormat::Json)
        .with_level(LogLevel::Debug)
        .with_spans(true);

    assert_eq!(config.format, LogFormat::Json);
    assert_eq!(config.level, LogLevel::Debug);
    assert!(config.enable_spans);
    assert!(config.logger_sink.is_none());
}

#[test]
fn test_card_fields_are_redacted() {
    assert_eq!(redact_if_sensitive("opaque_payment_card", "b3BjLWJsb2I="), "[REDACTED]");
    assert_eq!(redact_if_sensitive("pan", "4111111111111111"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("cvv", "123"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("Authorization", "Bearer x"), "[REDACTED]");
}

#[test]
fn test_normal_values_pass_through() {
    assert_eq!(redact_if_sensitive("provider", "SamsungPay"), "SamsungPay");
    assert_eq!(redact_if_sensitive("last_digits", "4242"), "4242");
    assert_eq!(redact_if_sensitive("request_code", "2"), "2");
}

#[test]
fn test_digit_runs_are_masked_in_free_text() {
    let masked = mask_digits("push failed for 5555555555554444 (status 15005)");
    assert_eq!(masked, "push failed for ************4444 (status 15005)");
}

#[test]
fn test_format_selection() {
    #[cfg(debug_assertions)]
    assert_eq!(LogFormat::default(), LogFormat::Pretty);

    #[cfg(not(debug_assertions))]
    assert_eq!(LogFormat::default(), LogFormat::Json);
}
