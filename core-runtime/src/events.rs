//! # Event Bus System
//!
//! Notifies the application layer about things that happen outside any
//! single call: inbound app-to-app messages becoming available, host-UI
//! operations being armed and settled, adapters being selected.
//!
//! ## Overview
//!
//! - **Event Types**: [`WalletEvent`] wraps per-domain enums
//! - **EventBus**: `tokio::sync::broadcast` channel for publishing events
//! - **EventStream**: receiver wrapper with optional filtering
//!
//! Emission never fails the operation that triggered it: with no subscriber
//! attached, events are simply dropped.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{EventBus, MessageEvent, WalletEvent};
//!
//! let bus = EventBus::new(16);
//! let mut rx = bus.subscribe();
//!
//! bus.emit(WalletEvent::Message(MessageEvent::NoMessage {
//!     provider: "GooglePay".to_string(),
//! }))
//! .ok();
//!
//! assert!(matches!(rx.try_recv(), Ok(WalletEvent::Message(_))));
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber missed `n` events; keep going.
//! - **`RecvError::Closed`**: the bus was dropped; stop listening.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 64;

// ============================================================================
// Wallet Event Types
// ============================================================================

/// Top-level event published on the bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum WalletEvent {
    /// Inbound app-to-app message events
    Message(MessageEvent),
    /// Host-UI operation lifecycle events
    Operation(OperationEvent),
    /// Implementation selection events
    Adapter(AdapterEvent),
}

impl WalletEvent {
    /// Provider the event concerns.
    pub fn provider(&self) -> &str {
        match self {
            WalletEvent::Message(e) => e.provider(),
            WalletEvent::Operation(e) => e.provider(),
            WalletEvent::Adapter(AdapterEvent::Selected { provider, .. }) => provider,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            WalletEvent::Message(e) => e.description(),
            WalletEvent::Operation(e) => e.description(),
            WalletEvent::Adapter(AdapterEvent::Selected { .. }) => "Adapter variant selected",
        }
    }

    pub fn severity(&self) -> EventSeverity {
        match self {
            WalletEvent::Operation(OperationEvent::Settled { outcome, .. }) => match outcome {
                OperationOutcome::Resolved => EventSeverity::Info,
                OperationOutcome::Canceled => EventSeverity::Info,
                OperationOutcome::Failed { .. } => EventSeverity::Warning,
            },
            WalletEvent::Message(MessageEvent::Ready { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Message Events
// ============================================================================

/// Events about the per-provider inbound message buffers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum MessageEvent {
    /// A message was classified to `provider` and is ready to drain.
    Ready {
        provider: String,
        action: String,
        sender: Option<String>,
        /// Payload decoded by the provider's classifier, when decodable
        decoded: Option<String>,
    },
    /// Nothing was received for `provider`; surfaced to a newly registered
    /// listener so it does not wait indefinitely.
    NoMessage { provider: String },
    /// The pending buffer of `provider` was cleared without being consumed.
    Cleared { provider: String },
}

impl MessageEvent {
    fn provider(&self) -> &str {
        match self {
            MessageEvent::Ready { provider, .. }
            | MessageEvent::NoMessage { provider }
            | MessageEvent::Cleared { provider } => provider,
        }
    }

    fn description(&self) -> &str {
        match self {
            MessageEvent::Ready { .. } => "Inbound message ready",
            MessageEvent::NoMessage { .. } => "No inbound message available",
            MessageEvent::Cleared { .. } => "Inbound message cleared",
        }
    }
}

// ============================================================================
// Operation Events
// ============================================================================

/// How a host-UI operation ended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind")]
pub enum OperationOutcome {
    Resolved,
    Canceled,
    Failed { status: i32 },
}

/// Events about operations awaiting a host-UI completion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum OperationEvent {
    /// An operation started and now waits for completion `code`.
    Armed { provider: String, code: i32 },
    /// The armed operation settled.
    Settled {
        provider: String,
        code: i32,
        outcome: OperationOutcome,
    },
}

impl OperationEvent {
    fn provider(&self) -> &str {
        match self {
            OperationEvent::Armed { provider, .. } | OperationEvent::Settled { provider, .. } => {
                provider
            }
        }
    }

    fn description(&self) -> &str {
        match self {
            OperationEvent::Armed { .. } => "Operation awaiting host completion",
            OperationEvent::Settled { .. } => "Operation settled",
        }
    }
}

// ============================================================================
// Adapter Events
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum AdapterEvent {
    /// `variant` is one of `Real`, `Mock`, `Stub`
    Selected { provider: String, variant: String },
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for wallet events.
///
/// Cheap to clone; clones share the same channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<WalletEvent>,
}

impl EventBus {
    /// Creates a new event bus buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error if there are none.
    pub fn emit(&self, event: WalletEvent) -> Result<usize, SendError<WalletEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<WalletEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&WalletEvent) -> bool + Send + Sync>;

/// A `broadcast::Receiver` with optional filtering.
///
/// ```rust
/// use core_runtime::events::{EventBus, EventStream, WalletEvent};
///
/// let bus = EventBus::new(16);
/// let google_only = EventStream::new(bus.subscribe())
///     .filter(|event| event.provider() == "GooglePay");
/// ```
pub struct EventStream {
    receiver: Receiver<WalletEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<WalletEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&WalletEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Receives the next event that passes the filter.
    ///
    /// # Errors
    ///
    /// `RecvError::Lagged(n)` if the subscriber fell behind by `n` events,
    /// `RecvError::Closed` once every sender is gone.
    pub async fn recv(&mut self) -> Result<WalletEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.matches(&event) {
                return Ok(event);
            }
        }
    }

    /// Non-blocking variant of [`recv`](Self::recv); `None` when nothing
    /// matching is queued.
    pub fn try_recv(&mut self) -> Option<WalletEvent> {
        while let Ok(event) = self.receiver.try_recv() {
            if self.matches(&event) {
                return Some(event);
            }
        }
        None
    }

    fn matches(&self, event: &WalletEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }
}
