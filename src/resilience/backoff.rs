//! Exponential backoff with jitter.

use std::time::Duration;
use rand::Rng;

/// Calculate exponential backoff delay with jitter.
///
/// Retry `attempt` (1-based) waits a uniformly random duration between
/// `base_ms` and `min(max_ms, base_ms * 2^attempt)`.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(0);
    }

    let exponential_base = 2u64.saturating_pow(attempt);
    let ceiling = base_ms.saturating_mul(exponential_base).min(max_ms);
    let floor = base_ms.min(ceiling);

    let delay_ms = if ceiling > floor {
        rand::thread_rng().gen_range(floor..=ceiling)
    } else {
        floor
    };

    Duration::from_millis(delay_ms)
}
