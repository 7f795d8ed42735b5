//! Capability Prober
//!
//! Answers whether a provider's native SDK is linked into this process.
//! Verdicts are computed on first use and then kept for the lifetime of the
//! prober, since what is linked cannot change without a restart.

use core_invoke::NativeRuntime;
use std::sync::{Arc, OnceLock};
use tracing::debug;

use crate::types::ProviderIdentity;

pub struct CapabilityProber {
    runtime: Option<Arc<NativeRuntime>>,
    google_pay: OnceLock<bool>,
    samsung_pay: OnceLock<bool>,
}

impl CapabilityProber {
    pub fn new(runtime: Arc<NativeRuntime>) -> Self {
        Self {
            runtime: Some(runtime),
            google_pay: OnceLock::new(),
            samsung_pay: OnceLock::new(),
        }
    }

    /// A prober for processes without any native runtime: nothing is available.
    pub fn detached() -> Self {
        Self {
            runtime: None,
            google_pay: OnceLock::new(),
            samsung_pay: OnceLock::new(),
        }
    }

    /// Never fails; any lookup problem reads as "not available".
    pub fn is_available(&self, provider: ProviderIdentity) -> bool {
        let slot = match provider {
            ProviderIdentity::GooglePay => &self.google_pay,
            ProviderIdentity::SamsungPay => &self.samsung_pay,
        };
        *slot.get_or_init(|| self.probe(provider))
    }

    fn probe(&self, provider: ProviderIdentity) -> bool {
        let available = self
            .runtime
            .as_ref()
            .is_some_and(|runtime| runtime.has_class(provider.marker_class()));
        debug!(%provider, available, "Probed native SDK");
        available
    }
}

impl std::fmt::Debug for CapabilityProber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityProber")
            .field("attached", &self.runtime.is_some())
            .field("google_pay", &self.google_pay.get())
            .field("samsung_pay", &self.samsung_pay.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_invoke::DynClass;

    #[test]
    fn test_detects_marker_class() {
        let runtime = Arc::new(NativeRuntime::new());
        runtime.register_class(Arc::new(DynClass::new(
            ProviderIdentity::GooglePay.marker_class(),
        )));

        let prober = CapabilityProber::new(runtime);
        assert!(prober.is_available(ProviderIdentity::GooglePay));
        assert!(!prober.is_available(ProviderIdentity::SamsungPay));
    }

    #[test]
    fn test_verdict_is_memoized() {
        let runtime = Arc::new(NativeRuntime::new());
        let prober = CapabilityProber::new(Arc::clone(&runtime));
        assert!(!prober.is_available(ProviderIdentity::SamsungPay));

        // Linking later does not change a verdict already given
        runtime.register_class(Arc::new(DynClass::new(
            ProviderIdentity::SamsungPay.marker_class(),
        )));
        assert!(!prober.is_available(ProviderIdentity::SamsungPay));
        assert!(CapabilityProber::new(runtime).is_available(ProviderIdentity::SamsungPay));
    }

    #[test]
    fn test_detached_reports_nothing() {
        let prober = CapabilityProber::detached();
        for provider in ProviderIdentity::ALL {
            assert!(!prober.is_available(provider));
        }
    }
}
