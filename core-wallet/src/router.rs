//! # Inter-App Message Router
//!
//! Classifies messages other applications deliver when they launch this
//! process, and buffers each one for the provider that claims it until a
//! listener drains it.
//!
//! ## Overview
//!
//! 1. The envelope's action and sender identity are offered to each
//!    provider's [`MessageClassifier`] in [`ProviderIdentity::ROUTING_ORDER`].
//! 2. The first provider that claims the message gets it in its single-slot
//!    buffer. An unconsumed earlier message is overwritten: only the most
//!    recent inbound message matters.
//! 3. When nobody claims it, every provider without a buffered message is
//!    marked "nothing received" so a listener registering later is told so
//!    instead of waiting.
//!
//! Buffers are owned by the router, which lives as long as the hosting
//! container's service; nothing here is process-global.
//!
//! If the container was started for a result and the message carries a
//! payload, [`MessageRouter::route`] returns the envelope to relaunch the
//! container with, after the message has been buffered.

use bridge_traits::{Extras, InboundEnvelope, LaunchMode};
use core_runtime::config::ProviderSettings;
use core_runtime::events::{EventBus, MessageEvent, WalletEvent};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::types::ProviderIdentity;

/// A provider's policy for claiming inbound messages.
pub trait MessageClassifier: Send + Sync {
    fn provider(&self) -> ProviderIdentity;

    /// Whether `sender` may deliver messages for this provider.
    fn is_valid_sender(&self, sender: Option<&str>) -> bool;

    fn is_relevant_action(&self, action: &str) -> bool;

    fn claims(&self, action: &str, sender: Option<&str>) -> bool {
        self.is_relevant_action(action) && self.is_valid_sender(sender)
    }

    /// Decode the payload for the "message ready" event. `None` when the
    /// payload is not in the provider's format; the raw payload is buffered
    /// either way.
    fn decode_payload(&self, _payload: &str) -> Option<String> {
        None
    }
}

/// Classifier of a provider that can never own a message.
#[derive(Debug, Clone, Copy)]
pub struct RejectAllClassifier {
    provider: ProviderIdentity,
}

impl RejectAllClassifier {
    pub fn new(provider: ProviderIdentity) -> Self {
        Self { provider }
    }
}

impl MessageClassifier for RejectAllClassifier {
    fn provider(&self) -> ProviderIdentity {
        self.provider
    }

    fn is_valid_sender(&self, _sender: Option<&str>) -> bool {
        false
    }

    fn is_relevant_action(&self, _action: &str) -> bool {
        false
    }
}

/// Payload decoder used for the "message ready" event.
pub type PayloadDecoder = fn(&str) -> Option<String>;

/// Claims messages whose action ends with a suffix and whose sender is on an
/// allow-list.
#[derive(Debug, Clone)]
pub struct AllowListClassifier {
    provider: ProviderIdentity,
    senders: Vec<String>,
    action_suffix: String,
    any_sender: bool,
    decoder: Option<PayloadDecoder>,
}

impl AllowListClassifier {
    pub fn new(provider: ProviderIdentity, settings: &ProviderSettings) -> Self {
        Self {
            provider,
            senders: settings.allowed_senders.clone(),
            action_suffix: settings.action_suffix.clone(),
            any_sender: false,
            decoder: None,
        }
    }

    /// Accept any identified sender; used by Mock variants so a test issuer
    /// app can deliver messages.
    pub fn accepting_any_sender(mut self) -> Self {
        self.any_sender = true;
        self
    }

    pub fn with_decoder(mut self, decoder: PayloadDecoder) -> Self {
        self.decoder = Some(decoder);
        self
    }
}

impl MessageClassifier for AllowListClassifier {
    fn provider(&self) -> ProviderIdentity {
        self.provider
    }

    fn is_valid_sender(&self, sender: Option<&str>) -> bool {
        match sender.map(str::trim).filter(|s| !s.is_empty()) {
            Some(sender) => self.any_sender || self.senders.iter().any(|s| s == sender),
            None => false,
        }
    }

    fn is_relevant_action(&self, action: &str) -> bool {
        action.ends_with(self.action_suffix.as_str())
    }

    fn decode_payload(&self, payload: &str) -> Option<String> {
        self.decoder.and_then(|decode| decode(payload))
    }
}

/// A message buffered for a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub action: String,
    pub payload: Option<String>,
    pub sender_identity: Option<String>,
    pub extras: Extras,
    pub claimed_provider: Option<ProviderIdentity>,
}

impl From<InboundEnvelope> for InboundMessage {
    fn from(envelope: InboundEnvelope) -> Self {
        Self {
            action: envelope.action,
            payload: envelope.payload,
            sender_identity: envelope.sender_identity,
            extras: envelope.extras,
            claimed_provider: None,
        }
    }
}

/// State of a provider's single-slot buffer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PendingState {
    #[default]
    Empty,
    Pending,
    NothingReceived,
}

#[derive(Debug, Default)]
enum Slot {
    #[default]
    Empty,
    Pending(InboundMessage),
    NothingReceived,
}

impl Slot {
    fn state(&self) -> PendingState {
        match self {
            Slot::Empty => PendingState::Empty,
            Slot::Pending(_) => PendingState::Pending,
            Slot::NothingReceived => PendingState::NothingReceived,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    Claimed(ProviderIdentity),
    Unclaimed,
}

/// What the host should do after routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDecision {
    pub outcome: RouteOutcome,
    /// Relaunch the container with this envelope before its result channel
    /// is torn down
    pub relaunch: Option<InboundEnvelope>,
}

#[derive(Default)]
struct RouterState {
    slots: HashMap<ProviderIdentity, Slot>,
    listeners: HashSet<ProviderIdentity>,
}

pub struct MessageRouter {
    classifiers: Vec<Arc<dyn MessageClassifier>>,
    state: Mutex<RouterState>,
    events: Option<EventBus>,
}

impl MessageRouter {
    /// Build a router over `classifiers`; they are consulted in routing
    /// order whatever order they are given in.
    pub fn new(classifiers: Vec<Arc<dyn MessageClassifier>>) -> Self {
        let mut classifiers = classifiers;
        classifiers.sort_by_key(|c| {
            ProviderIdentity::ROUTING_ORDER
                .iter()
                .position(|p| *p == c.provider())
                .unwrap_or(usize::MAX)
        });

        Self {
            classifiers,
            state: Mutex::new(RouterState::default()),
            events: None,
        }
    }

    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    fn classifier(&self, provider: ProviderIdentity) -> Option<&Arc<dyn MessageClassifier>> {
        self.classifiers.iter().find(|c| c.provider() == provider)
    }

    /// Classify and buffer `envelope`.
    ///
    /// When no provider claims it, every provider without a buffered message
    /// is marked as having received nothing and its listener is told so. A
    /// provider still holding an undrained message keeps it rather than
    /// losing it to an unrelated intent.
    pub fn route(&self, envelope: InboundEnvelope, launch_mode: LaunchMode) -> RouteDecision {
        let relaunch = (launch_mode == LaunchMode::ForResult && envelope.has_payload())
            .then(|| envelope.clone());

        let sender = envelope.sender_identity.as_deref();
        let claimant = self
            .classifiers
            .iter()
            .find(|c| c.claims(&envelope.action, sender))
            .cloned();

        let outcome = match claimant {
            Some(classifier) => {
                let provider = classifier.provider();
                let decoded = envelope
                    .payload
                    .as_deref()
                    .and_then(|p| classifier.decode_payload(p));

                let mut message = InboundMessage::from(envelope);
                message.claimed_provider = Some(provider);
                let ready = MessageEvent::Ready {
                    provider: provider.to_string(),
                    action: message.action.clone(),
                    sender: message.sender_identity.clone(),
                    decoded,
                };

                let previous = self.state.lock().slots.insert(provider, Slot::Pending(message));
                if matches!(previous, Some(Slot::Pending(_))) {
                    warn!(%provider, "Unconsumed inbound message overwritten");
                }

                info!(%provider, "Inbound message buffered");
                self.emit(ready);
                RouteOutcome::Claimed(provider)
            }
            None => {
                debug!(action = %envelope.action, "No provider claimed inbound message");
                let notify: Vec<ProviderIdentity> = {
                    let mut guard = self.state.lock();
                    let state = &mut *guard;
                    let mut notify = Vec::new();
                    for provider in ProviderIdentity::ALL {
                        let slot = state.slots.entry(provider).or_default();
                        if !matches!(slot, Slot::Pending(_)) {
                            *slot = Slot::NothingReceived;
                            if state.listeners.contains(&provider) {
                                notify.push(provider);
                            }
                        }
                    }
                    notify
                };
                for provider in notify {
                    self.emit(MessageEvent::NoMessage {
                        provider: provider.to_string(),
                    });
                }
                RouteOutcome::Unclaimed
            }
        };

        if relaunch.is_some() {
            debug!("Container was started for a result; relaunch requested");
        }

        RouteDecision { outcome, relaunch }
    }

    /// Take the buffered message for `provider`. Consume-once: later calls
    /// return `None` until another message is classified to it.
    pub fn drain_pending(&self, provider: ProviderIdentity) -> Option<InboundMessage> {
        let mut state = self.state.lock();
        match state.slots.remove(&provider) {
            Some(Slot::Pending(message)) => Some(message),
            Some(other) => {
                state.slots.insert(provider, other);
                None
            }
            None => None,
        }
    }

    /// Drop whatever is buffered for `provider`.
    pub fn clear_pending(&self, provider: ProviderIdentity) {
        let previous = self.state.lock().slots.remove(&provider);
        if matches!(previous, Some(Slot::Pending(_))) {
            self.emit(MessageEvent::Cleared {
                provider: provider.to_string(),
            });
        }
    }

    pub fn pending_state(&self, provider: ProviderIdentity) -> PendingState {
        self.state.lock()
            .slots
            .get(&provider)
            .map(Slot::state)
            .unwrap_or_default()
    }

    /// Register interest in `provider`'s messages and replay its buffer
    /// state as an event, so a late listener learns about a message (or the
    /// lack of one) that arrived before it.
    pub fn register_listener(&self, provider: ProviderIdentity) -> PendingState {
        let (state, replay) = {
            let mut state = self.state.lock();
            state.listeners.insert(provider);
            let replay = match state.slots.get(&provider) {
                Some(Slot::Pending(message)) => Some(MessageEvent::Ready {
                    provider: provider.to_string(),
                    action: message.action.clone(),
                    sender: message.sender_identity.clone(),
                    decoded: message
                        .payload
                        .as_deref()
                        .and_then(|p| self.classifier(provider).and_then(|c| c.decode_payload(p))),
                }),
                Some(Slot::NothingReceived) => Some(MessageEvent::NoMessage {
                    provider: provider.to_string(),
                }),
                _ => None,
            };
            let current = state.slots.get(&provider).map(Slot::state).unwrap_or_default();
            (current, replay)
        };

        if let Some(event) = replay {
            self.emit(event);
        }
        state
    }

    pub fn unregister_listener(&self, provider: ProviderIdentity) {
        self.state.lock().listeners.remove(&provider);
    }

    fn emit(&self, event: MessageEvent) {
        if let Some(events) = &self.events {
            events.emit(WalletEvent::Message(event)).ok();
        }
    }
}

impl std::fmt::Debug for MessageRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let providers: Vec<_> = self.classifiers.iter().map(|c| c.provider()).collect();
        f.debug_struct("MessageRouter")
            .field("classifiers", &providers)
            .finish()
    }
}
