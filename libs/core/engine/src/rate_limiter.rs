//! Token-bucket rate limiter shared by every worker of one operation
//! class (reads or writes). Burst equals the configured rate, so a
//! momentary burst of offered load cannot exceed one second's worth of
//! tokens. Both the rate and the burst can be retuned in place while
//! workers are waiting on the bucket.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

struct BucketState {
    rate_per_sec: f64,
    burst: f64,
    tokens: f64,
    last_refill: Instant,
}

pub struct RateLimiter {
    state: Mutex<BucketState>,
}

impl RateLimiter {
    pub fn new(rate_per_sec: f64, burst: f64) -> Self {
        let burst = burst.max(0.0);
        Self {
            state: Mutex::new(BucketState {
                rate_per_sec: rate_per_sec.max(0.0),
                burst,
                tokens: burst,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Retunes rate and burst in place. Existing waiters pick up the new
    /// numbers on their next refill check; nothing is woken explicitly.
    pub fn retune(&self, rate_per_sec: f64, burst: f64) {
        let mut state = self.state.lock().expect("rate limiter mutex poisoned");
        state.rate_per_sec = rate_per_sec.max(0.0);
        state.burst = burst.max(0.0);
        state.tokens = state.tokens.min(state.burst);
    }

    /// Waits for one token, honoring cancellation. Returns `false` if
    /// the cancellation token fired before a token was granted; a
    /// cancelled wait never consumes a token. A rate of zero never
    /// grants a token — callers block until cancelled.
    pub async fn acquire(&self, cancellation: &CancellationToken) -> bool {
        loop {
            if cancellation.is_cancelled() {
                return false;
            }

            let wait = {
                let mut state = self.state.lock().expect("rate limiter mutex poisoned");
                refill(&mut state);

                if state.rate_per_sec <= 0.0 {
                    None
                } else if state.tokens >= 1.0 {
                    state.tokens -= 1.0;
                    return true;
                } else {
                    let deficit = 1.0 - state.tokens;
                    Some(Duration::from_secs_f64(deficit / state.rate_per_sec))
                }
            };

            // Cap the sleep so a later retune (raising the rate from
            // zero, or shortening the deficit) is noticed promptly.
            let wait = wait.unwrap_or(Duration::from_millis(200)).min(Duration::from_millis(200));

            tokio::select! {
                _ = cancellation.cancelled() => return false,
                _ = tokio::time::sleep(wait) => continue,
            }
        }
    }
}

fn refill(state: &mut BucketState) {
    let now = Instant::now();
    let elapsed = now.duration_since(state.last_refill).as_secs_f64();
    state.last_refill = now;
    if state.rate_per_sec > 0.0 {
        state.tokens = (state.tokens + elapsed * state.rate_per_sec).min(state.burst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn grants_tokens_up_to_burst_without_waiting() {
        let limiter = RateLimiter::new(100.0, 5.0);
        let cancellation = CancellationToken::new();
        for _ in 0..5 {
            assert!(limiter.acquire(&cancellation).await);
        }
    }

    #[tokio::test]
    async fn zero_rate_blocks_until_cancelled() {
        let limiter = RateLimiter::new(0.0, 1.0);
        let cancellation = CancellationToken::new();
        let cancel_clone = cancellation.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            cancel_clone.cancel();
        });
        let granted = limiter.acquire(&cancellation).await;
        assert!(!granted);
    }

    #[tokio::test]
    async fn retune_raises_effective_rate_immediately() {
        let limiter = RateLimiter::new(1.0, 1.0);
        let cancellation = CancellationToken::new();
        assert!(limiter.acquire(&cancellation).await);
        limiter.retune(1_000.0, 1_000.0);
        // Should now refill fast enough to grant another token quickly.
        let granted = tokio::time::timeout(Duration::from_millis(250), limiter.acquire(&cancellation))
            .await
            .expect("did not time out");
        assert!(granted);
    }
}
