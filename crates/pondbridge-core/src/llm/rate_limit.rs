//! Token-bucket rate limiter for outbound provider requests.
//!
//! Replaces the fixed pre-request sleep the original service used as a
//! crude throttle. The bucket refills continuously at a configured
//! sustained rate and allows short bursts up to its capacity.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Internal bucket state guarded by the mutex.
#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

/// Asynchronous token bucket.
///
/// `acquire` suspends until a token is available, so callers queue in
/// FIFO order behind the internal mutex rather than spinning.
#[derive(Debug)]
pub struct TokenBucket {
    capacity: f64,
    refill_per_sec: f64,
    state: Mutex<BucketState>,
}

impl TokenBucket {
    /// Create a bucket allowing `requests_per_minute` sustained, with
    /// bursts up to `burst` requests.
    ///
    /// Both values are clamped to at least 1.
    pub fn per_minute(requests_per_minute: u32, burst: u32) -> Self {
        let capacity = f64::from(burst.max(1));
        Self {
            capacity,
            refill_per_sec: f64::from(requests_per_minute.max(1)) / 60.0,
            state: Mutex::new(BucketState {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Take one token, waiting for refill when the bucket is empty.
    pub async fn acquire(&self) {
        let mut state = self.state.lock().await;
        loop {
            self.refill(&mut state);
            if state.tokens >= 1.0 {
                state.tokens -= 1.0;
                return;
            }
            let deficit = 1.0 - state.tokens;
            let wait = Duration::from_secs_f64(deficit / self.refill_per_sec);
            tokio::time::sleep(wait).await;
        }
    }

    /// Take one token without waiting. Returns false when empty.
    pub async fn try_acquire(&self) -> bool {
        let mut state = self.state.lock().await;
        self.refill(&mut state);
        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    fn refill(&self, state: &mut BucketState) {
        let now = Instant::now();
        let elapsed = now.duration_since(state.last_refill).as_secs_f64();
        state.tokens = (state.tokens + elapsed * self.refill_per_sec).min(self.capacity);
        state.last_refill = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_burst_up_to_capacity() {
        let bucket = TokenBucket::per_minute(60, 3);
        assert!(bucket.try_acquire().await);
        assert!(bucket.try_acquire().await);
        assert!(bucket.try_acquire().await);
        assert!(!bucket.try_acquire().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refills_at_sustained_rate() {
        // 60/min = 1 token per second.
        let bucket = TokenBucket::per_minute(60, 1);
        assert!(bucket.try_acquire().await);
        assert!(!bucket.try_acquire().await);

        tokio::time::advance(Duration::from_millis(1_100)).await;
        assert!(bucket.try_acquire().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquire_waits_for_refill() {
        let bucket = TokenBucket::per_minute(60, 1);
        bucket.acquire().await;

        let start = Instant::now();
        bucket.acquire().await;
        // The second acquire had to wait roughly one refill interval.
        assert!(start.elapsed() >= Duration::from_millis(900));
    }

    #[tokio::test(start_paused = true)]
    async fn test_does_not_accumulate_beyond_capacity() {
        let bucket = TokenBucket::per_minute(600, 2);
        tokio::time::advance(Duration::from_secs(60)).await;

        assert!(bucket.try_acquire().await);
        assert!(bucket.try_acquire().await);
        assert!(!bucket.try_acquire().await);
    }

    #[tokio::test]
    async fn test_zero_config_is_clamped() {
        let bucket = TokenBucket::per_minute(0, 0);
        assert!(bucket.try_acquire().await);
    }
}
