//! Per-connection churn lifetime sampling.
//!
//! Each worker samples its own connection lifetime independently off an
//! exponential distribution, so that across a fleet of connections the
//! aggregate churn rate converges on the declared connections-per-second
//! figure without any cross-worker coordination.

use std::time::Duration;

use rand::Rng;

const MIN_LIFETIME: Duration = Duration::from_millis(100);
const MAX_LIFETIME: Duration = Duration::from_secs(60);

/// Samples a connection lifetime for a per-connection churn rate of
/// `rate_per_sec` events/second. `None` means "never churn" — a zero
/// rate leaves the connection alone until the worker itself is
/// cancelled.
pub fn sample_lifetime(rate_per_sec: f64) -> Option<Duration> {
    if rate_per_sec <= 0.0 {
        return None;
    }
    let mean_secs = 1.0 / rate_per_sec;
    let uniform: f64 = rand::thread_rng().gen_range(f64::EPSILON..1.0);
    let exponential_sample = -uniform.ln(); // E ~ Exp(1), mean 1
    let lifetime_secs = exponential_sample * mean_secs;
    Some(Duration::from_secs_f64(lifetime_secs).clamp(MIN_LIFETIME, MAX_LIFETIME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_rate_never_churns() {
        assert_eq!(sample_lifetime(0.0), None);
    }

    #[test]
    fn lifetime_is_always_within_clamp_bounds() {
        for _ in 0..10_000 {
            let lifetime = sample_lifetime(1000.0).expect("nonzero rate samples a lifetime");
            assert!(lifetime >= MIN_LIFETIME);
            assert!(lifetime <= MAX_LIFETIME);
        }
    }

    #[test]
    fn low_rate_clamps_to_max_lifetime_often() {
        // Mean lifetime here is 1000s, far past the 60s clamp, so nearly
        // every sample should land on the ceiling.
        let lifetime = sample_lifetime(0.001).expect("nonzero rate samples a lifetime");
        assert!(lifetime <= MAX_LIFETIME);
    }
}
