//! # Wallet Bridge Configuration
//!
//! Provides configuration management for the wallet bridge.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a
//! [`WalletConfig`] holding the host bridges and the per-provider settings.
//! It validates eagerly so a misconfigured host fails at startup rather than
//! in the middle of a provisioning flow.
//!
//! ## Required Dependencies
//!
//! - `HostContainer` - The UI container provisioning flows are launched from
//!
//! ## Optional Dependencies (with platform defaults)
//!
//! - `HttpClient` - Mock backend transport (desktop default: reqwest). Without
//!   one, Mock adapters serve canned data only.
//!
//! When the `desktop-shims` feature is enabled, desktop defaults for both are
//! injected automatically if not provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{ProviderSettings, WalletConfig};
//! use std::sync::Arc;
//!
//! let config = WalletConfig::builder()
//!     .host(Arc::new(MyActivityHost::new()))
//!     .samsung_service_id("partner-service-id")
//!     .google_pay(ProviderSettings::google_pay().with_force_mock(true))
//!     .build()
//!     .expect("Failed to build config");
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::{ProviderSettings, WalletConfig};
//!
//! // An empty sender allow-list can never claim a message
//! let config = WalletConfig::builder()
//!     .google_pay(ProviderSettings::google_pay().with_allowed_senders(Vec::<String>::new()))
//!     .build()
//!     .expect("Should fail - empty sender allow-list");
//! ```

use crate::error::{Error, Result};
use bridge_traits::{HostContainer, HttpClient};
use std::sync::Arc;
use std::time::Duration;

/// Default address of the local mock backend.
pub const DEFAULT_MOCK_BASE_URL: &str = "http://127.0.0.1:3000";

/// Default per-request timeout against the mock backend.
pub const DEFAULT_MOCK_TIMEOUT: Duration = Duration::from_secs(3);

/// Applications allowed to deliver Google Pay app-to-app messages.
pub const GOOGLE_PAY_SENDERS: &[&str] = &[
    "com.google.android.gms",
    "com.google.android.apps.walletnfcrel",
];

/// Applications allowed to deliver Samsung Pay app-to-app messages.
pub const SAMSUNG_PAY_SENDERS: &[&str] = &[
    "com.samsung.android.spay",
    "com.samsung.android.samsungpay.gear",
];

/// Action suffix of Google Pay token activation messages.
pub const GOOGLE_PAY_ACTION_SUFFIX: &str = "ACTIVATE_TOKEN";

/// Action suffix of Samsung Pay identity verification messages.
pub const SAMSUNG_PAY_ACTION_SUFFIX: &str = "LAUNCH_A2A_IDV";

/// Settings shared by both providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    /// Force the Mock adapter regardless of SDK availability
    pub force_mock: bool,
    /// Package identities whose inbound messages this provider accepts
    pub allowed_senders: Vec<String>,
    /// Inbound actions ending with this suffix belong to this provider
    pub action_suffix: String,
    /// Base URL of the mock backend, without trailing slash
    pub mock_base_url: String,
    /// Timeout for each mock backend request
    pub mock_timeout: Duration,
}

impl ProviderSettings {
    fn with_defaults(senders: &[&str], action_suffix: &str) -> Self {
        Self {
            force_mock: false,
            allowed_senders: senders.iter().map(|s| s.to_string()).collect(),
            action_suffix: action_suffix.to_string(),
            mock_base_url: DEFAULT_MOCK_BASE_URL.to_string(),
            mock_timeout: DEFAULT_MOCK_TIMEOUT,
        }
    }

    /// Defaults for the Google Pay provider.
    pub fn google_pay() -> Self {
        Self::with_defaults(GOOGLE_PAY_SENDERS, GOOGLE_PAY_ACTION_SUFFIX)
    }

    /// Defaults for the Samsung Pay provider.
    pub fn samsung_pay() -> Self {
        Self::with_defaults(SAMSUNG_PAY_SENDERS, SAMSUNG_PAY_ACTION_SUFFIX)
    }

    pub fn with_force_mock(mut self, force_mock: bool) -> Self {
        self.force_mock = force_mock;
        self
    }

    pub fn with_allowed_senders<I, S>(mut self, senders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_senders = senders.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_action_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.action_suffix = suffix.into();
        self
    }

    pub fn with_mock_base_url(mut self, url: impl Into<String>) -> Self {
        self.mock_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_mock_timeout(mut self, timeout: Duration) -> Self {
        self.mock_timeout = timeout;
        self
    }

    /// Validates the settings of the provider called `name`.
    pub fn validate(&self, name: &str) -> Result<()> {
        if self.allowed_senders.is_empty() || self.allowed_senders.iter().any(|s| s.is_empty()) {
            return Err(Error::Config(format!(
                "{name}: allowed senders must contain at least one non-empty package name"
            )));
        }

        if self.action_suffix.trim().is_empty() {
            return Err(Error::Config(format!(
                "{name}: action suffix cannot be empty"
            )));
        }

        let url = self.mock_base_url.as_str();
        let has_scheme = url.starts_with("http://") || url.starts_with("https://");
        let host_part = url.split("://").nth(1).unwrap_or_default();
        if !has_scheme || host_part.is_empty() {
            return Err(Error::Config(format!(
                "{name}: mock base URL must be an absolute http(s) URL, got '{url}'"
            )));
        }

        if self.mock_timeout.is_zero() {
            return Err(Error::Config(format!(
                "{name}: mock timeout must be greater than zero"
            )));
        }

        Ok(())
    }
}

/// Wallet bridge configuration.
///
/// Use [`WalletConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct WalletConfig {
    /// Google Pay (tap-and-pay) settings
    pub google_pay: ProviderSettings,

    /// Samsung Pay settings
    pub samsung_pay: ProviderSettings,

    /// Samsung Pay partner service id; the Real Samsung adapter cannot
    /// initialize without it
    pub samsung_service_id: Option<String>,

    /// Mock backend transport (optional)
    pub http_client: Option<Arc<dyn HttpClient>>,

    /// Host UI container (required)
    pub host: Arc<dyn HostContainer>,

    /// Capacity of the wallet event bus
    pub event_buffer_size: usize,
}

impl std::fmt::Debug for WalletConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletConfig")
            .field("google_pay", &self.google_pay)
            .field("samsung_pay", &self.samsung_pay)
            .field(
                "samsung_service_id",
                &self.samsung_service_id.as_ref().map(|_| "[set]"),
            )
            .field(
                "http_client",
                &self.http_client.as_ref().map(|_| "HttpClient { ... }"),
            )
            .field("host", &"HostContainer { ... }")
            .field("event_buffer_size", &self.event_buffer_size)
            .finish()
    }
}

impl WalletConfig {
    /// Creates a new builder for constructing a `WalletConfig`.
    pub fn builder() -> WalletConfigBuilder {
        WalletConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        self.google_pay.validate("google_pay")?;
        self.samsung_pay.validate("samsung_pay")?;

        if self
            .samsung_service_id
            .as_deref()
            .is_some_and(|id| id.trim().is_empty())
        {
            return Err(Error::Config(
                "Samsung Pay service id cannot be blank; omit it instead".to_string(),
            ));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg_attr(feature = "desktop-shims", allow(dead_code))]
fn host_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "HostContainer".to_string(),
        message: "A HostContainer is required to launch provisioning flows. \
                 Desktop: ensure the 'desktop-shims' feature is enabled to use the recording host. \
                 Android: inject the activity-backed host from the platform shim."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_host() -> Result<Arc<dyn HostContainer>> {
    let host: Arc<dyn HostContainer> = Arc::new(bridge_desktop::RecordingHostContainer::new());
    Ok(host)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_host() -> Result<Arc<dyn HostContainer>> {
    Err(host_missing_error())
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client() -> Result<Option<Arc<dyn HttpClient>>> {
    let client = bridge_desktop::ReqwestHttpClient::new().map_err(|e| {
        Error::Internal(format!("Failed to create default HTTP client: {}", e))
    })?;
    let client: Arc<dyn HttpClient> = Arc::new(client);
    Ok(Some(client))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client() -> Result<Option<Arc<dyn HttpClient>>> {
    Ok(None)
}

/// Builder for constructing [`WalletConfig`] instances.
pub struct WalletConfigBuilder {
    google_pay: ProviderSettings,
    samsung_pay: ProviderSettings,
    samsung_service_id: Option<String>,
    http_client: Option<Arc<dyn HttpClient>>,
    host: Option<Arc<dyn HostContainer>>,
    event_buffer_size: usize,
}

impl Default for WalletConfigBuilder {
    fn default() -> Self {
        Self {
            google_pay: ProviderSettings::google_pay(),
            samsung_pay: ProviderSettings::samsung_pay(),
            samsung_service_id: None,
            http_client: None,
            host: None,
            event_buffer_size: crate::events::DEFAULT_EVENT_BUFFER_SIZE,
        }
    }
}

impl WalletConfigBuilder {
    pub fn google_pay(mut self, settings: ProviderSettings) -> Self {
        self.google_pay = settings;
        self
    }

    pub fn samsung_pay(mut self, settings: ProviderSettings) -> Self {
        self.samsung_pay = settings;
        self
    }

    pub fn samsung_service_id(mut self, service_id: impl Into<String>) -> Self {
        self.samsung_service_id = Some(service_id.into());
        self
    }

    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn host(mut self, host: Arc<dyn HostContainer>) -> Self {
        self.host = Some(host);
        self
    }

    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = size;
        self
    }

    /// Builds the configuration, injecting platform defaults for missing
    /// bridges where the `desktop-shims` feature provides them.
    ///
    /// # Errors
    ///
    /// - [`Error::CapabilityMissing`] when no host container is available
    /// - [`Error::Config`] when a setting is invalid
    pub fn build(self) -> Result<WalletConfig> {
        let host = match self.host {
            Some(host) => host,
            None => provide_default_host()?,
        };

        let http_client = match self.http_client {
            Some(client) => Some(client),
            None => provide_default_http_client()?,
        };

        let config = WalletConfig {
            google_pay: self.google_pay,
            samsung_pay: self.samsung_pay,
            samsung_service_id: self.samsung_service_id,
            http_client,
            host,
            event_buffer_size: self.event_buffer_size,
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::{HostIntent, InboundEnvelope};

    struct NoopHost;

    impl HostContainer for NoopHost {
        fn start_for_result(&self, _intent: HostIntent, _request_code: i32) -> BridgeResult<()> {
            Ok(())
        }

        fn relaunch(&self, _envelope: InboundEnvelope) -> BridgeResult<()> {
            Ok(())
        }
    }

    fn builder() -> WalletConfigBuilder {
        WalletConfig::builder().host(Arc::new(NoopHost))
    }

    #[test]
    fn test_defaults() {
        let config = builder().build().unwrap();

        assert!(!config.google_pay.force_mock);
        assert!(!config.samsung_pay.force_mock);
        assert_eq!(config.google_pay.action_suffix, GOOGLE_PAY_ACTION_SUFFIX);
        assert_eq!(config.samsung_pay.action_suffix, SAMSUNG_PAY_ACTION_SUFFIX);
        assert_eq!(config.google_pay.allowed_senders.len(), 2);
        assert_eq!(config.samsung_pay.mock_base_url, DEFAULT_MOCK_BASE_URL);
        assert!(config.samsung_service_id.is_none());
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_builder_requires_host() {
        let err = WalletConfig::builder().build().unwrap_err();
        assert!(matches!(err, Error::CapabilityMissing { ref capability, .. } if capability == "HostContainer"));
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_http_client_is_optional() {
        let config = builder().build().unwrap();
        assert!(config.http_client.is_none());
    }

    #[test]
    fn test_mock_base_url_trailing_slash_is_trimmed() {
        let settings = ProviderSettings::google_pay().with_mock_base_url("http://10.0.2.2:3000/");
        assert_eq!(settings.mock_base_url, "http://10.0.2.2:3000");
    }

    #[test]
    fn test_rejects_relative_mock_url() {
        let err = builder()
            .samsung_pay(ProviderSettings::samsung_pay().with_mock_base_url("localhost:3000"))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.starts_with("samsung_pay")));
    }

    #[test]
    fn test_rejects_empty_senders() {
        let err = builder()
            .google_pay(ProviderSettings::google_pay().with_allowed_senders(vec![""]))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_rejects_blank_service_id() {
        let err = builder().samsung_service_id("  ").build().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_rejects_zero_event_buffer() {
        let err = builder().event_buffer_size(0).build().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_debug_hides_service_id() {
        let config = builder().samsung_service_id("secret-partner").build().unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret-partner"));
        assert!(rendered.contains("[set]"));
    }
}
