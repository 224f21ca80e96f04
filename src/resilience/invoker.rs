//! Resilient invocation of a single remote operation.
//!
//! # Responsibilities
//! - Run a caller-supplied operation until it succeeds or the policy stops
//! - Retry transient failures with capped exponential backoff
//! - Propagate exactly one failure: the last one observed
//! - Optionally abort during a backoff delay when cancellation is signalled
//!
//! # Design Decisions
//! - Attempts are strictly sequential; delays suspend only the current task
//! - The operation must be safe to repeat; side effects are not deduplicated
//! - Each retried failure logs attempt, status and delay; the final failure
//!   is only propagated

use std::future::Future;
use std::time::Duration;

use tokio::sync::broadcast::{self, error::RecvError};

use crate::observability::metrics;
use crate::resilience::classify::{Failure, FailureClassification};
use crate::resilience::error::InvokeError;
use crate::resilience::policy::{RetryDecision, RetryPolicy};

/// Outcome of one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    TransientFailure,
    TerminalFailure,
}

impl From<FailureClassification> for AttemptOutcome {
    fn from(class: FailureClassification) -> Self {
        match class {
            FailureClassification::Transient => AttemptOutcome::TransientFailure,
            FailureClassification::Terminal => AttemptOutcome::TerminalFailure,
        }
    }
}

/// What happened on one attempt. Only lives for the duration of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptRecord {
    /// 1-based attempt index.
    pub attempt: u32,
    pub outcome: AttemptOutcome,
    /// Status reported by the failure, if any.
    pub status: Option<u16>,
    /// Delay applied before the next attempt; `None` when no attempt follows.
    pub delay: Option<Duration>,
}

/// Executes remote operations under a shared [`RetryPolicy`].
///
/// Cheap to clone and safe to share across tasks; it holds no per-call state.
#[derive(Debug, Clone, Default)]
pub struct ResilientInvoker {
    policy: RetryPolicy,
}

impl ResilientInvoker {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `operation` until it succeeds, fails terminally, or the attempt
    /// budget is spent.
    pub async fn call<T, E, F, Fut>(&self, operation: F) -> Result<T, InvokeError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Failure,
    {
        self.run(operation, |_| {}, None).await
    }

    /// Like [`call`](Self::call), reporting every attempt to `observer`.
    pub async fn call_observed<T, E, F, Fut, O>(
        &self,
        operation: F,
        observer: O,
    ) -> Result<T, InvokeError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Failure,
        O: FnMut(&AttemptRecord),
    {
        self.run(operation, observer, None).await
    }

    /// Like [`call`](Self::call), but a message on `cancel` during a backoff
    /// delay aborts the sequence with [`InvokeError::Cancelled`].
    ///
    /// An attempt already in flight is never interrupted.
    pub async fn call_with_cancel<T, E, F, Fut>(
        &self,
        operation: F,
        cancel: &mut broadcast::Receiver<()>,
    ) -> Result<T, InvokeError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Failure,
    {
        self.run(operation, |_| {}, Some(cancel)).await
    }

    async fn run<T, E, F, Fut, O>(
        &self,
        mut operation: F,
        mut observer: O,
        mut cancel: Option<&mut broadcast::Receiver<()>>,
    ) -> Result<T, InvokeError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Failure,
        O: FnMut(&AttemptRecord),
    {
        let mut attempt = 1u32;

        loop {
            let error = match operation().await {
                Ok(value) => {
                    observer(&AttemptRecord {
                        attempt,
                        outcome: AttemptOutcome::Success,
                        status: None,
                        delay: None,
                    });
                    return Ok(value);
                }
                Err(error) => error,
            };

            let status = error.status();
            let class = error.classification();
            let decision = self.policy.decide(attempt, class);

            observer(&AttemptRecord {
                attempt,
                outcome: class.into(),
                status,
                delay: match decision {
                    RetryDecision::RetryAfter(delay) => Some(delay),
                    RetryDecision::Stop => None,
                },
            });

            let delay = match decision {
                RetryDecision::RetryAfter(delay) => delay,
                RetryDecision::Stop => return Err(self.give_up(attempt, class, status, error)),
            };

            tracing::warn!(
                attempt,
                max_attempts = self.policy.max_attempts,
                status = ?status,
                delay_ms = delay.as_millis() as u64,
                "Transient failure, retrying"
            );
            metrics::record_retry(status);

            match cancel.as_deref_mut() {
                Some(signal) => {
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = cancelled(signal) => {
                            tracing::info!(attempt, "Retry sequence cancelled");
                            let err = InvokeError::Cancelled { attempt, source: error };
                            metrics::record_give_up(err.kind());
                            return Err(err);
                        }
                    }
                }
                None => tokio::time::sleep(delay).await,
            }

            attempt += 1;
        }
    }

    fn give_up<E>(
        &self,
        attempt: u32,
        class: FailureClassification,
        status: Option<u16>,
        source: E,
    ) -> InvokeError<E> {
        let err = match class {
            FailureClassification::Terminal => InvokeError::Terminal { attempt, source },
            FailureClassification::Transient => InvokeError::Exhausted {
                attempts: attempt,
                source,
            },
        };

        tracing::debug!(
            attempt,
            status = ?status,
            kind = err.kind(),
            "Giving up on remote operation"
        );
        metrics::record_give_up(err.kind());

        err
    }
}

/// Resolves when a cancellation message arrives. A closed channel never
/// cancels.
async fn cancelled(signal: &mut broadcast::Receiver<()>) {
    if let Err(RecvError::Closed) = signal.recv().await {
        std::future::pending::<()>().await;
    }
}
