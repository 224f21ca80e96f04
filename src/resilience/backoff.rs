//! Capped exponential backoff.

use std::time::Duration;

/// Calculate the delay that follows a failed attempt.
///
/// `attempt` is the 1-based index of the attempt that just failed, so the
/// first retry waits `base_ms * 2`, the second `base_ms * 4`, and so on,
/// never more than `max_ms`. Arithmetic saturates instead of overflowing.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    let factor = 2u64.checked_pow(attempt).unwrap_or(u64::MAX);
    let delay_ms = base_ms.saturating_mul(factor).min(max_ms);

    Duration::from_millis(delay_ms)
}
