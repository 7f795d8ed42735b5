//! The wallet service: one adapter per provider plus the inbound-message
//! router, driven by the host's lifecycle callbacks.

use std::sync::Arc;

use bridge_traits::{ActivityResult, HostContainer, InboundEnvelope, LaunchMode};
use core_invoke::{DynamicBridge, NativeRuntime};
use core_runtime::config::WalletConfig;
use core_runtime::events::{AdapterEvent, EventBus, EventStream, WalletEvent};
use core_wallet::{
    AdapterVariant, CapabilityProber, HostContext, ImplementationSelector, InboundMessage,
    MessageRouter, PendingState, ProviderIdentity, RouteDecision, StubAdapter, WalletAdapter,
    WalletError,
};
use tokio::sync::broadcast::Receiver;
use tracing::{debug, info, instrument, warn};

use crate::error::Result;
use crate::launches::LaunchLog;

/// Entry point for host applications.
///
/// Variants are chosen once, at construction:
///
/// 1. `mock-<provider>` feature or `ProviderSettings::force_mock` → Mock
/// 2. provider crate compiled out, or SDK marker class absent → Stub
/// 3. otherwise → Real
pub struct WalletService {
    config: WalletConfig,
    selector: ImplementationSelector,
    google_pay: Arc<dyn WalletAdapter>,
    samsung_pay: Arc<dyn WalletAdapter>,
    router: MessageRouter,
    events: EventBus,
    launches: Arc<LaunchLog>,
}

impl WalletService {
    /// Build the service over the native classes the host shim registered.
    pub fn new(config: WalletConfig, runtime: Arc<NativeRuntime>) -> Result<Self> {
        let events = EventBus::new(config.event_buffer_size);
        Self::with_event_bus(config, runtime, events)
    }

    /// Build the service for a process without any native SDK; every
    /// provider that is not forced to mock gets the Stub.
    pub fn without_native(config: WalletConfig) -> Result<Self> {
        Self::new(config, Arc::new(NativeRuntime::new()))
    }

    /// Like [`new`](Self::new), publishing onto an existing bus so that
    /// selection events can be observed.
    pub fn with_event_bus(
        config: WalletConfig,
        runtime: Arc<NativeRuntime>,
        events: EventBus,
    ) -> Result<Self> {
        config.validate()?;

        let prober = Arc::new(CapabilityProber::new(Arc::clone(&runtime)));
        let selector = ImplementationSelector::new(prober)
            .force_mock(
                ProviderIdentity::GooglePay,
                cfg!(feature = "mock-google-pay") || config.google_pay.force_mock,
            )
            .linked(ProviderIdentity::GooglePay, cfg!(feature = "google-pay"))
            .force_mock(
                ProviderIdentity::SamsungPay,
                cfg!(feature = "mock-samsung-pay") || config.samsung_pay.force_mock,
            )
            .linked(ProviderIdentity::SamsungPay, cfg!(feature = "samsung-pay"));

        let bridge = DynamicBridge::new(runtime);
        let launches = Arc::new(LaunchLog::new());
        let build = |provider: ProviderIdentity| {
            let variant = selector.select(provider);
            events
                .emit(WalletEvent::Adapter(AdapterEvent::Selected {
                    provider: provider.to_string(),
                    variant: variant.to_string(),
                }))
                .ok();
            let host = launches.host_for(provider, Arc::clone(&config.host));
            build_adapter(provider, variant, &config, host, &bridge, &events)
        };
        let google_pay = build(ProviderIdentity::GooglePay);
        let samsung_pay = build(ProviderIdentity::SamsungPay);

        let router = MessageRouter::new(vec![google_pay.classifier(), samsung_pay.classifier()])
            .with_events(events.clone());

        info!(
            google_pay = %google_pay.variant(),
            samsung_pay = %samsung_pay.variant(),
            "Wallet service ready"
        );

        Ok(Self {
            config,
            selector,
            google_pay,
            samsung_pay,
            router,
            events,
            launches,
        })
    }

    pub fn adapter(&self, provider: ProviderIdentity) -> Arc<dyn WalletAdapter> {
        match provider {
            ProviderIdentity::GooglePay => Arc::clone(&self.google_pay),
            ProviderIdentity::SamsungPay => Arc::clone(&self.samsung_pay),
        }
    }

    pub fn variant(&self, provider: ProviderIdentity) -> AdapterVariant {
        self.selector.select(provider)
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    pub fn router(&self) -> &MessageRouter {
        &self.router
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn subscribe(&self) -> Receiver<WalletEvent> {
        self.events.subscribe()
    }

    /// Events concerning `provider` only.
    pub fn provider_events(&self, provider: ProviderIdentity) -> EventStream {
        let name = provider.to_string();
        EventStream::new(self.events.subscribe()).filter(move |event| event.provider() == name)
    }

    /// Hand the hosting screen to every adapter.
    ///
    /// Returns the providers whose setup failed; the others are usable.
    #[instrument(skip(self, context))]
    pub fn attach_host_context(&self, context: HostContext) -> Vec<(ProviderIdentity, WalletError)> {
        ProviderIdentity::ALL
            .into_iter()
            .filter_map(|provider| match self.adapter(provider).initialize(context.clone()) {
                Ok(()) => None,
                Err(e) => {
                    warn!(%provider, error = %e, "Adapter setup failed");
                    Some((provider, e))
                }
            })
            .collect()
    }

    /// Forward a host activity result; `true` when an adapter was waiting
    /// on it.
    ///
    /// A result for a launch that went through the host container goes to
    /// the adapter that launched it, newest launch first. Results for flows
    /// the SDK launched itself are offered to each adapter in turn.
    pub fn on_activity_result(&self, result: &ActivityResult) -> bool {
        if let Some(provider) = self.launches.take_latest(result.request_code) {
            if self.adapter(provider).on_host_result(result) {
                return true;
            }
            debug!(%provider, request_code = result.request_code, "Launcher no longer waiting");
        }
        let settled = ProviderIdentity::ALL
            .into_iter()
            .any(|provider| self.adapter(provider).on_host_result(result));
        if !settled {
            debug!(request_code = result.request_code, "Activity result not claimed");
        }
        settled
    }

    /// Classify and buffer an inbound app-to-app message, then relaunch the
    /// container when it was started for a result and the message carries a
    /// payload.
    #[instrument(skip(self, envelope), fields(action = %envelope.action))]
    pub fn on_new_intent(
        &self,
        envelope: InboundEnvelope,
        launch_mode: LaunchMode,
    ) -> Result<RouteDecision> {
        let decision = self.router.route(envelope, launch_mode);
        if let Some(relaunch) = decision.relaunch.clone() {
            info!("Relaunching host container with the inbound payload");
            self.config.host.relaunch(relaunch)?;
        }
        Ok(decision)
    }

    pub fn register_listener(&self, provider: ProviderIdentity) -> PendingState {
        self.router.register_listener(provider)
    }

    pub fn unregister_listener(&self, provider: ProviderIdentity) {
        self.router.unregister_listener(provider)
    }

    pub fn drain_pending(&self, provider: ProviderIdentity) -> Option<InboundMessage> {
        self.router.drain_pending(provider)
    }

    pub fn clear_pending(&self, provider: ProviderIdentity) {
        self.router.clear_pending(provider)
    }

    /// Availability of every provider, in [`ProviderIdentity::ALL`] order.
    pub async fn availability(&self) -> Vec<(ProviderIdentity, bool)> {
        let mut report = Vec::with_capacity(ProviderIdentity::ALL.len());
        for provider in ProviderIdentity::ALL {
            report.push((provider, self.adapter(provider).check_availability().await));
        }
        report
    }
}

#[allow(unused_variables)]
fn build_adapter(
    provider: ProviderIdentity,
    variant: AdapterVariant,
    config: &WalletConfig,
    host: Arc<dyn HostContainer>,
    bridge: &DynamicBridge,
    events: &EventBus,
) -> Arc<dyn WalletAdapter> {
    match (provider, variant) {
        #[cfg(feature = "google-pay")]
        (ProviderIdentity::GooglePay, AdapterVariant::Real) => Arc::new(
            provider_google_pay::GooglePayAdapter::new(
                bridge.clone(),
                host,
                &config.google_pay,
            )
            .with_events(events.clone()),
        ),
        #[cfg(feature = "google-pay")]
        (ProviderIdentity::GooglePay, AdapterVariant::Mock) => Arc::new(
            provider_google_pay::MockGooglePayAdapter::new(
                config.http_client.clone(),
                &config.google_pay,
            ),
        ),
        #[cfg(feature = "samsung-pay")]
        (ProviderIdentity::SamsungPay, AdapterVariant::Real) => Arc::new(
            provider_samsung_pay::SamsungPayAdapter::new(
                bridge.clone(),
                host,
                &config.samsung_pay,
                config.samsung_service_id.clone(),
            )
            .with_events(events.clone()),
        ),
        #[cfg(feature = "samsung-pay")]
        (ProviderIdentity::SamsungPay, AdapterVariant::Mock) => Arc::new(
            provider_samsung_pay::MockSamsungPayAdapter::new(
                config.http_client.clone(),
                &config.samsung_pay,
            ),
        ),
        _ => Arc::new(StubAdapter::new(provider)),
    }
}

impl std::fmt::Debug for WalletService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletService")
            .field("google_pay", &self.google_pay.variant())
            .field("samsung_pay", &self.samsung_pay.variant())
            .field("router", &self.router)
            .finish()
    }
}
