//! Attribution of host launches to the provider that made them.
//!
//! Both providers number their host-UI operations the same way, so a bare
//! request code does not say whose result it is. Each adapter gets its own
//! [`TrackedHost`] around the shared container; the [`LaunchLog`] remembers
//! who launched which code so the service can hand the result back to that
//! adapter.

use std::collections::HashMap;
use std::sync::Arc;

use bridge_traits::error::Result;
use bridge_traits::{HostContainer, HostIntent, InboundEnvelope};
use core_wallet::ProviderIdentity;
use parking_lot::Mutex;
use tracing::debug;

/// Launchers per request code, oldest first.
#[derive(Debug, Default)]
pub struct LaunchLog {
    launches: Mutex<HashMap<i32, Vec<ProviderIdentity>>>,
}

impl LaunchLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host container for `provider` that records its launches here.
    pub fn host_for(
        self: &Arc<Self>,
        provider: ProviderIdentity,
        inner: Arc<dyn HostContainer>,
    ) -> Arc<dyn HostContainer> {
        Arc::new(TrackedHost {
            provider,
            inner,
            log: Arc::clone(self),
        })
    }

    /// Provider that most recently launched `request_code` and has not been
    /// answered yet. The newest screen sits on top of the host's stack, so it
    /// is the one finishing.
    pub fn take_latest(&self, request_code: i32) -> Option<ProviderIdentity> {
        let mut launches = self.launches.lock();
        let launchers = launches.get_mut(&request_code)?;
        let provider = launchers.pop();
        if launchers.is_empty() {
            launches.remove(&request_code);
        }
        provider
    }

    fn record(&self, request_code: i32, provider: ProviderIdentity) {
        self.launches
            .lock()
            .entry(request_code)
            .or_default()
            .push(provider);
    }

    fn forget(&self, request_code: i32, provider: ProviderIdentity) {
        let mut launches = self.launches.lock();
        if let Some(launchers) = launches.get_mut(&request_code) {
            if let Some(index) = launchers.iter().rposition(|p| *p == provider) {
                launchers.remove(index);
            }
            if launchers.is_empty() {
                launches.remove(&request_code);
            }
        }
    }
}

struct TrackedHost {
    provider: ProviderIdentity,
    inner: Arc<dyn HostContainer>,
    log: Arc<LaunchLog>,
}

impl HostContainer for TrackedHost {
    fn start_for_result(&self, intent: HostIntent, request_code: i32) -> Result<()> {
        // The host may answer before start_for_result returns.
        self.log.record(request_code, self.provider);
        let launched = self.inner.start_for_result(intent, request_code);
        if launched.is_err() {
            self.log.forget(request_code, self.provider);
        } else {
            debug!(provider = %self.provider, request_code, "Host launch recorded");
        }
        launched
    }

    fn relaunch(&self, envelope: InboundEnvelope) -> Result<()> {
        self.inner.relaunch(envelope)
    }

    fn is_attached(&self) -> bool {
        self.inner.is_attached()
    }
}
