//! Wallet service façade and bootstrap helpers.
//!
//! This crate wires the host-provided bridges (host UI container, mock
//! backend transport) and the native class registry into one
//! [`WalletService`]. Provider crates are compiled in through the
//! `google-pay` and `samsung-pay` features; `mock-google-pay` and
//! `mock-samsung-pay` force the Mock variant at build time. Desktop and
//! development builds enable `desktop-shims`, which supplies a recording
//! host container and a reqwest-backed HTTP client.
//!
//! ## Host lifecycle
//!
//! | Host callback | Service entry point |
//! |---------------|---------------------|
//! | screen created | [`WalletService::attach_host_context`] |
//! | activity result | [`WalletService::on_activity_result`] |
//! | new intent | [`WalletService::on_new_intent`] |
//! | listener added / removed | [`WalletService::register_listener`] / [`WalletService::unregister_listener`] |

pub mod error;
pub mod launches;
pub mod service;

pub use error::{Result, ServiceError};
pub use service::WalletService;

#[cfg(feature = "desktop-shims")]
pub use bridge_desktop::{RecordingHostContainer, ReqwestHttpClient};

/// Convenience bootstrapper for desktop and development hosts.
///
/// Uses the default configuration (recording host container, reqwest mock
/// backend transport) over the given native class registry.
///
/// ```
/// # #[cfg(feature = "desktop-shims")]
/// # fn example() -> core_service::Result<()> {
/// use std::sync::Arc;
/// use core_invoke::NativeRuntime;
/// use core_wallet::ProviderIdentity;
///
/// let service = core_service::bootstrap_desktop(Arc::new(NativeRuntime::new()))?;
/// let adapter = service.adapter(ProviderIdentity::GooglePay);
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "desktop-shims")]
pub fn bootstrap_desktop(
    runtime: std::sync::Arc<core_invoke::NativeRuntime>,
) -> Result<WalletService> {
    let config = core_runtime::config::WalletConfig::builder()
        .build()
        .map_err(|err| ServiceError::InitializationFailed(err.to_string()))?;
    WalletService::new(config, runtime)
}
