//! Recording host container
//!
//! Desktop builds have no activity to launch provisioning screens from. This
//! container remembers what would have been launched so a development
//! harness (or a test) can inspect it and feed results back by hand.

use bridge_traits::{
    error::{BridgeError, Result},
    HostContainer, HostIntent, InboundEnvelope,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

/// Host container that records launches instead of showing UI.
#[derive(Debug)]
pub struct RecordingHostContainer {
    attached: AtomicBool,
    started: Mutex<Vec<(HostIntent, i32)>>,
    relaunched: Mutex<Vec<InboundEnvelope>>,
}

impl Default for RecordingHostContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingHostContainer {
    pub fn new() -> Self {
        Self {
            attached: AtomicBool::new(true),
            started: Mutex::new(Vec::new()),
            relaunched: Mutex::new(Vec::new()),
        }
    }

    /// Simulate the activity going away (or coming back).
    pub fn set_attached(&self, attached: bool) {
        self.attached.store(attached, Ordering::SeqCst);
    }

    /// Intents launched so far, with their request codes.
    pub fn started(&self) -> Vec<(HostIntent, i32)> {
        self.started.lock().clone()
    }

    /// Envelopes the container was asked to relaunch with.
    pub fn relaunched(&self) -> Vec<InboundEnvelope> {
        self.relaunched.lock().clone()
    }

    fn ensure_attached(&self) -> Result<()> {
        if self.attached.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(BridgeError::HostDetached(
                "No activity is attached to the recording host".to_string(),
            ))
        }
    }
}

impl HostContainer for RecordingHostContainer {
    fn start_for_result(&self, intent: HostIntent, request_code: i32) -> Result<()> {
        self.ensure_attached()?;
        info!(action = %intent.action, request_code, "Recording host launch");
        self.started.lock().push((intent, request_code));
        Ok(())
    }

    fn relaunch(&self, envelope: InboundEnvelope) -> Result<()> {
        self.ensure_attached()?;
        info!(action = %envelope.action, "Recording host relaunch");
        self.relaunched.lock().push(envelope);
        Ok(())
    }

    fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }
}
