//! Errors produced by the resilient invoker.

use thiserror::Error;

use crate::resilience::classify::{Failure, FailureClassification};

/// The single failure an invocation hands back to its caller.
///
/// Every variant carries the last failure the operation produced; retries
/// that happened before it are invisible to the caller.
#[derive(Debug, Error)]
pub enum InvokeError<E> {
    /// A terminal classification stopped the sequence.
    #[error("terminal failure on attempt {attempt}: {source}")]
    Terminal { attempt: u32, source: E },

    /// The attempt budget ran out while every failure was transient.
    #[error("gave up after {attempts} attempts: {source}")]
    Exhausted { attempts: u32, source: E },

    /// Cancellation arrived while waiting to retry.
    #[error("cancelled after attempt {attempt}: {source}")]
    Cancelled { attempt: u32, source: E },
}

impl<E> InvokeError<E> {
    /// The last failure observed.
    pub fn source_ref(&self) -> &E {
        match self {
            InvokeError::Terminal { source, .. }
            | InvokeError::Exhausted { source, .. }
            | InvokeError::Cancelled { source, .. } => source,
        }
    }

    pub fn into_source(self) -> E {
        match self {
            InvokeError::Terminal { source, .. }
            | InvokeError::Exhausted { source, .. }
            | InvokeError::Cancelled { source, .. } => source,
        }
    }

    /// Number of attempts made before the failure was propagated.
    pub fn attempts(&self) -> u32 {
        match self {
            InvokeError::Terminal { attempt, .. } | InvokeError::Cancelled { attempt, .. } => {
                *attempt
            }
            InvokeError::Exhausted { attempts, .. } => *attempts,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, InvokeError::Exhausted { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, InvokeError::Cancelled { .. })
    }

    /// Metric label for the kind of give-up.
    pub fn kind(&self) -> &'static str {
        match self {
            InvokeError::Terminal { .. } => "terminal",
            InvokeError::Exhausted { .. } => "exhausted",
            InvokeError::Cancelled { .. } => "cancelled",
        }
    }
}

impl<E: Failure> InvokeError<E> {
    /// Classification of the last failure.
    pub fn classification(&self) -> FailureClassification {
        self.source_ref().classification()
    }

    pub fn status(&self) -> Option<u16> {
        self.source_ref().status()
    }
}
