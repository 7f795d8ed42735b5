//! Implementation Selector
//!
//! Picks the variant backing each provider:
//!
//! 1. Forced to mock (build feature or configuration) → `Mock`
//! 2. SDK not linked into this build, or absent at runtime → `Stub`
//! 3. Otherwise → `Real`
//!
//! A provider whose crate is compiled out cannot be mocked either; it always
//! gets the Stub. Each selection is computed once per selector.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::prober::CapabilityProber;
use crate::types::{AdapterVariant, ProviderIdentity};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Policy {
    force_mock: bool,
    linked: bool,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            force_mock: false,
            linked: true,
        }
    }
}

pub struct ImplementationSelector {
    prober: Arc<CapabilityProber>,
    policies: HashMap<ProviderIdentity, Policy>,
    selected: Mutex<HashMap<ProviderIdentity, AdapterVariant>>,
}

impl ImplementationSelector {
    pub fn new(prober: Arc<CapabilityProber>) -> Self {
        Self {
            prober,
            policies: HashMap::new(),
            selected: Mutex::new(HashMap::new()),
        }
    }

    pub fn force_mock(mut self, provider: ProviderIdentity, force: bool) -> Self {
        self.policies.entry(provider).or_default().force_mock = force;
        self
    }

    /// Whether the provider's adapter crate is compiled into this build.
    pub fn linked(mut self, provider: ProviderIdentity, linked: bool) -> Self {
        self.policies.entry(provider).or_default().linked = linked;
        self
    }

    pub fn prober(&self) -> &Arc<CapabilityProber> {
        &self.prober
    }

    /// Idempotent: repeated calls return the first answer.
    pub fn select(&self, provider: ProviderIdentity) -> AdapterVariant {
        let mut selected = self.selected.lock();

        *selected.entry(provider).or_insert_with(|| {
            let variant = self.decide(provider);
            info!(%provider, %variant, "Selected adapter variant");
            variant
        })
    }

    fn decide(&self, provider: ProviderIdentity) -> AdapterVariant {
        let policy = self.policies.get(&provider).copied().unwrap_or_default();

        if !policy.linked {
            AdapterVariant::Stub
        } else if policy.force_mock {
            AdapterVariant::Mock
        } else if !self.prober.is_available(provider) {
            AdapterVariant::Stub
        } else {
            AdapterVariant::Real
        }
    }
}

impl std::fmt::Debug for ImplementationSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImplementationSelector")
            .field("prober", &self.prober)
            .field("policies", &self.policies)
            .finish()
    }
}
