//! Host UI Container Abstractions
//!
//! Types exchanged with the platform screen that hosts wallet flows: intents
//! launched for a result, the results reported back, and the envelopes other
//! applications use to launch this process.

use std::collections::BTreeMap;

use crate::error::Result;

/// Result code reported by the host when a launched flow succeeded.
pub const RESULT_OK: i32 = -1;

/// Result code reported by the host when the user backed out of a flow.
pub const RESULT_CANCELED: i32 = 0;

/// String extras attached to intents, results and envelopes.
pub type Extras = BTreeMap<String, String>;

/// Classified result code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultStatus {
    Ok,
    Canceled,
    Other(i32),
}

impl From<i32> for ResultStatus {
    fn from(code: i32) -> Self {
        match code {
            RESULT_OK => ResultStatus::Ok,
            RESULT_CANCELED => ResultStatus::Canceled,
            other => ResultStatus::Other(other),
        }
    }
}

/// Completion of a flow previously started with
/// [`HostContainer::start_for_result`] or by a native SDK on the host's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityResult {
    pub request_code: i32,
    pub result_code: i32,
    pub extras: Extras,
}

impl ActivityResult {
    pub fn new(request_code: i32, result_code: i32) -> Self {
        Self {
            request_code,
            result_code,
            extras: Extras::new(),
        }
    }

    pub fn ok(request_code: i32) -> Self {
        Self::new(request_code, RESULT_OK)
    }

    pub fn canceled(request_code: i32) -> Self {
        Self::new(request_code, RESULT_CANCELED)
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extras.insert(key.into(), value.into());
        self
    }

    pub fn extra(&self, key: &str) -> Option<&str> {
        self.extras.get(key).map(String::as_str)
    }

    pub fn status(&self) -> ResultStatus {
        ResultStatus::from(self.result_code)
    }
}

/// Request to launch a platform screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostIntent {
    pub action: String,
    pub extras: Extras,
}

impl HostIntent {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            extras: Extras::new(),
        }
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extras.insert(key.into(), value.into());
        self
    }
}

/// How the hosting container itself was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LaunchMode {
    #[default]
    Standard,
    /// Started by another application that expects a result back
    ForResult,
}

/// Message delivered by the host when another application launches this
/// process.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InboundEnvelope {
    pub action: String,
    /// Extra payload carried by the message, opaque to this layer
    pub payload: Option<String>,
    /// Package identity of the calling application, when the platform knows it
    pub sender_identity: Option<String>,
    pub extras: Extras,
}

impl InboundEnvelope {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            ..Default::default()
        }
    }

    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender_identity = Some(sender.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extras.insert(key.into(), value.into());
        self
    }

    pub fn has_payload(&self) -> bool {
        self.payload.as_deref().is_some_and(|p| !p.is_empty()) || !self.extras.is_empty()
    }
}

/// The platform screen hosting wallet flows.
///
/// - **Android**: the React/host `Activity`
/// - **Desktop**: a recording stand-in used for development
///
/// All methods are called from the host's UI context.
pub trait HostContainer: Send + Sync {
    /// Launch `intent` and report its completion later as an
    /// [`ActivityResult`] carrying `request_code`.
    fn start_for_result(&self, intent: HostIntent, request_code: i32) -> Result<()>;

    /// Finish the current container and start a fresh one with `envelope`.
    fn relaunch(&self, envelope: InboundEnvelope) -> Result<()>;

    /// Whether a container is currently attached and able to launch flows.
    fn is_attached(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_status() {
        assert_eq!(ActivityResult::ok(2).status(), ResultStatus::Ok);
        assert_eq!(ActivityResult::canceled(2).status(), ResultStatus::Canceled);
        assert_eq!(ActivityResult::new(2, 7).status(), ResultStatus::Other(7));
    }

    #[test]
    fn test_result_extras() {
        let result = ActivityResult::ok(2).with_extra("extra_issuer_token_id", "tok-1");
        assert_eq!(result.extra("extra_issuer_token_id"), Some("tok-1"));
        assert_eq!(result.extra("missing"), None);
    }

    #[test]
    fn test_envelope_payload_detection() {
        assert!(!InboundEnvelope::new("a.ACTIVATE_TOKEN").has_payload());
        assert!(!InboundEnvelope::new("a").with_payload("").has_payload());
        assert!(InboundEnvelope::new("a").with_payload("e30=").has_payload());
        assert!(InboundEnvelope::new("a").with_extra("k", "v").has_payload());
    }
}
