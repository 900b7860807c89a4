use std::time::Duration;

use rand::Rng;

/// Check if an error message indicates upstream throttling
pub fn is_rate_limit_error(error_msg: &str) -> bool {
    error_msg.contains("429") || error_msg.contains("Too Many Requests")
}

/// Calculate exponential backoff with jitter
/// Based on: https://www.helius.dev/docs/rpc/optimization-techniques
pub fn calculate_backoff_with_jitter(
    attempt: usize,
    base_delay_ms: u64,
    max_delay_ms: u64,
) -> Duration {
    let exponential_delay = base_delay_ms.saturating_mul(3u64.saturating_pow(attempt as u32));

    let capped_delay = exponential_delay.min(max_delay_ms);

    // ±25% jitter
    let mut rng = rand::rng();
    let jitter_range = (capped_delay as f64 * 0.25) as u64;
    let jitter = rng.random_range(0..=jitter_range * 2);
    let final_delay = capped_delay.saturating_add(jitter).saturating_sub(jitter_range);

    Duration::from_millis(final_delay)
}
