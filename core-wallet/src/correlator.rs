//! # Pending-Operation Correlator
//!
//! Bridges a fire-and-forget native launch back to the single caller
//! awaiting it.
//!
//! ## Overview
//!
//! `Idle -> Armed(code) -> Idle`. An operation that needs the host UI arms
//! the correlator with its request code and a decoder for the success
//! payload, then launches. When the host later reports an
//! [`ActivityResult`] with that code the correlator settles the waiting
//! [`PendingResult`] exactly once:
//!
//! - `RESULT_OK`: the decoder's result
//! - `RESULT_CANCELED`: [`WalletError::UserCanceled`]
//! - anything else: [`WalletError::ProviderError`] with the raw code
//!
//! Completions for another code, or arriving while idle, are ignored.
//!
//! The armed slot is written from the UI context and settled from provider
//! callback threads, so it sits behind a mutex. Arming while armed replaces
//! the previous operation; its waiter is rejected as superseded.
//! There is no timeout: a completion that never comes leaves the caller
//! waiting.

use bridge_traits::{ActivityResult, ResultStatus};
use core_runtime::events::{EventBus, OperationEvent, OperationOutcome, WalletEvent};
use parking_lot::Mutex;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::error::{Result, WalletError};
use crate::types::ProviderIdentity;

type Settle = Box<dyn FnOnce(&ActivityResult) -> OperationOutcome + Send>;

struct Armed {
    code: i32,
    settle: Settle,
}

pub struct OperationCorrelator {
    provider: ProviderIdentity,
    armed: Mutex<Option<Armed>>,
    events: Option<EventBus>,
}

impl OperationCorrelator {
    pub fn new(provider: ProviderIdentity) -> Self {
        Self {
            provider,
            armed: Mutex::new(None),
            events: None,
        }
    }

    /// Publish `Armed`/`Settled` events on `events`.
    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    /// Wait for a completion with `code`, decoding a successful one with
    /// `decode`.
    ///
    /// Arm before launching so a completion delivered synchronously by the
    /// launch is not lost.
    pub fn arm<T, D>(&self, code: i32, decode: D) -> PendingResult<T>
    where
        T: Send + 'static,
        D: FnOnce(&ActivityResult) -> Result<T> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let provider = self.provider;

        let settle: Settle = Box::new(move |result: &ActivityResult| {
            let (settled, outcome) = match result.status() {
                ResultStatus::Ok => match decode(result) {
                    Ok(value) => (Ok(value), OperationOutcome::Resolved),
                    Err(err) => (Err(err), OperationOutcome::Failed { status: result.result_code }),
                },
                ResultStatus::Canceled => (Err(WalletError::UserCanceled), OperationOutcome::Canceled),
                ResultStatus::Other(status) => (
                    Err(WalletError::provider_error(
                        Some(status),
                        format!("{provider} reported result code {status} for request {code}"),
                    )),
                    OperationOutcome::Failed { status },
                ),
            };

            if tx.send(settled).is_err() {
                debug!(%provider, code, "Waiter dropped before the operation settled");
            }
            outcome
        });

        let previous = self.armed.lock().replace(Armed { code, settle });
        if let Some(previous) = previous {
            warn!(
                provider = %self.provider,
                previous_code = previous.code,
                code,
                "Operation armed while another was pending; the earlier caller is rejected"
            );
        }

        debug!(provider = %self.provider, code, "Operation armed");
        self.emit(OperationEvent::Armed {
            provider: self.provider.to_string(),
            code,
        });

        PendingResult { code, rx }
    }

    /// Arm `code`, then run `launch`. A failed launch disarms again and its
    /// error is returned instead of a pending result.
    pub fn launch<T, D, L>(&self, code: i32, decode: D, launch: L) -> Result<PendingResult<T>>
    where
        T: Send + 'static,
        D: FnOnce(&ActivityResult) -> Result<T> + Send + 'static,
        L: FnOnce() -> Result<()>,
    {
        let pending = self.arm(code, decode);
        if let Err(err) = launch() {
            warn!(provider = %self.provider, code, error = %err, "Launch failed; disarming");
            self.disarm(code);
            return Err(err);
        }
        Ok(pending)
    }

    /// Disarm `code` without settling, e.g. when its launch failed.
    pub fn disarm(&self, code: i32) -> bool {
        self.take_if(code).is_some()
    }

    /// Settle the armed operation if `result` is its completion.
    ///
    /// Returns `false` for foreign or stale completions, which are ignored.
    pub fn complete(&self, result: &ActivityResult) -> bool {
        let Some(armed) = self.take_if(result.request_code) else {
            debug!(
                provider = %self.provider,
                request_code = result.request_code,
                "Ignoring completion with no matching armed operation"
            );
            return false;
        };

        let outcome = (armed.settle)(result);
        info!(
            provider = %self.provider,
            code = armed.code,
            ?outcome,
            "Operation settled"
        );
        self.emit(OperationEvent::Settled {
            provider: self.provider.to_string(),
            code: armed.code,
            outcome,
        });
        true
    }

    /// Code of the armed operation, if any.
    pub fn armed_code(&self) -> Option<i32> {
        self.armed.lock().as_ref().map(|a| a.code)
    }

    fn take_if(&self, code: i32) -> Option<Armed> {
        let mut slot = self.armed.lock();
        if slot.as_ref().is_some_and(|armed| armed.code == code) {
            slot.take()
        } else {
            None
        }
    }

    fn emit(&self, event: OperationEvent) {
        if let Some(events) = &self.events {
            events.emit(WalletEvent::Operation(event)).ok();
        }
    }
}

impl std::fmt::Debug for OperationCorrelator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationCorrelator")
            .field("provider", &self.provider)
            .field("armed_code", &self.armed_code())
            .finish()
    }
}

/// Deferred result of an armed operation. Resolves at most once.
#[must_use = "a pending result does nothing unless awaited"]
pub struct PendingResult<T> {
    code: i32,
    rx: oneshot::Receiver<Result<T>>,
}

impl<T> PendingResult<T> {
    pub fn code(&self) -> i32 {
        self.code
    }
}

impl<T> Future for PendingResult<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let code = self.code;
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(settled)) => Poll::Ready(settled),
            Poll::Ready(Err(_)) => Poll::Ready(Err(WalletError::provider_error(
                None,
                format!("Operation {code} was superseded before it completed"),
            ))),
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::RESULT_OK;

    fn correlator() -> OperationCorrelator {
        OperationCorrelator::new(ProviderIdentity::GooglePay)
    }

    fn token_id(result: &ActivityResult) -> Result<String> {
        result
            .extra("extra_issuer_token_id")
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .ok_or_else(|| WalletError::provider_error(None, "missing token id"))
    }

    #[tokio::test]
    async fn test_resolves_with_decoded_payload() {
        let correlator = correlator();
        let pending = correlator.arm(2, token_id);
        assert_eq!(correlator.armed_code(), Some(2));

        assert!(correlator.complete(&ActivityResult::ok(2).with_extra("extra_issuer_token_id", "tok-9")));
        assert_eq!(pending.await.unwrap(), "tok-9");
        assert_eq!(correlator.armed_code(), None);
    }

    #[tokio::test]
    async fn test_second_completion_is_ignored() {
        let correlator = correlator();
        let pending = correlator.arm(2, token_id);

        assert!(correlator.complete(&ActivityResult::ok(2).with_extra("extra_issuer_token_id", "first")));
        assert!(!correlator.complete(&ActivityResult::ok(2).with_extra("extra_issuer_token_id", "late")));
        assert_eq!(pending.await.unwrap(), "first");
    }

    #[tokio::test]
    async fn test_cancellation_rejects_with_user_canceled() {
        let correlator = correlator();
        let pending = correlator.arm(2, token_id);
        correlator.complete(&ActivityResult::canceled(2));
        assert_eq!(pending.await.unwrap_err(), WalletError::UserCanceled);
    }

    #[tokio::test]
    async fn test_other_code_rejects_with_raw_status() {
        let correlator = correlator();
        let pending = correlator.arm(4, |_| Ok(true));
        correlator.complete(&ActivityResult::new(4, 15005));
        match pending.await.unwrap_err() {
            WalletError::ProviderError { status, .. } => assert_eq!(status, Some(15005)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_foreign_code_is_ignored() {
        let correlator = correlator();
        let pending = correlator.arm(2, token_id);

        assert!(!correlator.complete(&ActivityResult::ok(4)));
        assert_eq!(correlator.armed_code(), Some(2));

        correlator.complete(&ActivityResult::ok(2).with_extra("extra_issuer_token_id", "tok"));
        assert!(pending.await.is_ok());
    }

    #[test]
    fn test_idle_completion_is_ignored() {
        assert!(!correlator().complete(&ActivityResult::new(2, RESULT_OK)));
    }

    #[tokio::test]
    async fn test_decode_failure_rejects() {
        let correlator = correlator();
        let pending = correlator.arm(2, token_id);
        correlator.complete(&ActivityResult::ok(2));
        assert_eq!(pending.await.unwrap_err().code(), "PROVIDER_ERROR");
    }

    #[tokio::test]
    async fn test_rearming_supersedes_previous_waiter() {
        let correlator = correlator();
        let first = correlator.arm(2, token_id);
        let second = correlator.arm(4, |_| Ok("created".to_string()));

        let err = first.await.unwrap_err();
        assert!(err.to_string().contains("superseded"));

        correlator.complete(&ActivityResult::ok(4));
        assert_eq!(second.await.unwrap(), "created");
    }

    #[tokio::test]
    async fn test_disarm() {
        let correlator = correlator();
        let pending = correlator.arm(5, |_| Ok(true));
        assert!(!correlator.disarm(4));
        assert!(correlator.disarm(5));
        assert!(!correlator.complete(&ActivityResult::ok(5)));
        assert!(pending.await.is_err());
    }

    #[test]
    fn test_failed_launch_disarms() {
        let correlator = correlator();
        let result = correlator.launch(3, |_| Ok(()), || {
            Err(WalletError::provider_error(None, "no activity"))
        });
        assert!(result.is_err());
        assert_eq!(correlator.armed_code(), None);

        let pending = correlator.launch(3, |_| Ok(()), || Ok(())).unwrap();
        assert_eq!(pending.code(), 3);
        assert_eq!(correlator.armed_code(), Some(3));
    }

    #[tokio::test]
    async fn test_settles_from_another_thread() {
        let correlator = std::sync::Arc::new(correlator());
        let pending = correlator.arm(2, token_id);

        let remote = std::sync::Arc::clone(&correlator);
        std::thread::spawn(move || {
            remote.complete(&ActivityResult::ok(2).with_extra("extra_issuer_token_id", "tok-t"));
        })
        .join()
        .unwrap();

        assert_eq!(pending.await.unwrap(), "tok-t");
    }

    #[tokio::test]
    async fn test_emits_lifecycle_events() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        let correlator = correlator().with_events(bus);

        let pending = correlator.arm(4, |_| Ok(true));
        correlator.complete(&ActivityResult::canceled(4));
        let _ = pending.await;

        assert_eq!(
            rx.recv().await.unwrap(),
            WalletEvent::Operation(OperationEvent::Armed {
                provider: "GooglePay".to_string(),
                code: 4
            })
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            WalletEvent::Operation(OperationEvent::Settled {
                provider: "GooglePay".to_string(),
                code: 4,
                outcome: OperationOutcome::Canceled
            })
        );
    }
}
