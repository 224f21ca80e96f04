//! Retry policy: attempt budget and backoff bounds.

use std::time::Duration;

use crate::config::RetryConfig;
use crate::resilience::backoff::calculate_backoff;
use crate::resilience::classify::FailureClassification;

/// Decision returned by the retry policy after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Propagate the failure to the caller.
    Stop,
    /// Sleep for the given delay, then make the next attempt.
    RetryAfter(Duration),
}

/// Bounded exponential backoff policy.
///
/// Built once at startup from [`RetryConfig`] and shared read-only by every
/// invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    /// Base delay in milliseconds.
    pub base_delay_ms: u64,
    /// Upper bound on any single delay in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            max_delay_ms: 16_000,
        }
    }
}

impl RetryPolicy {
    /// Create a policy. An attempt budget of zero is raised to one.
    pub fn new(max_attempts: u32, base_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay_ms,
            max_delay_ms,
        }
    }

    /// Delay inserted after `attempt` (1-based) fails transiently.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        calculate_backoff(attempt, self.base_delay_ms, self.max_delay_ms)
    }

    /// Sum of every delay in a sequence that fails transiently on each
    /// attempt. Saturates instead of overflowing.
    pub fn total_backoff(&self) -> Duration {
        let cap = Duration::from_millis(self.max_delay_ms);
        let mut total = Duration::ZERO;

        for attempt in 1..self.max_attempts {
            let delay = self.delay_for(attempt);
            if delay >= cap {
                let remaining = self.max_attempts - attempt;
                return total.saturating_add(delay.saturating_mul(remaining));
            }
            total = total.saturating_add(delay);
        }

        total
    }

    /// Decide what happens after `attempt` failed with `class`.
    pub fn decide(&self, attempt: u32, class: FailureClassification) -> RetryDecision {
        if class == FailureClassification::Terminal || attempt >= self.max_attempts {
            return RetryDecision::Stop;
        }

        RetryDecision::RetryAfter(self.delay_for(attempt))
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, config.base_delay_ms, config.max_delay_ms)
    }
}
