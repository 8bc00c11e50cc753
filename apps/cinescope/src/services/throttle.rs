//! Fixed-delay throttle for outbound API calls.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Enforces a minimum interval between consecutive upstream requests.
///
/// Callers queue on the mutex, so concurrent requests are spaced out one
/// interval apart instead of bursting.
#[derive(Debug)]
pub struct Throttle {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl Throttle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval,
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// Wait until the throttle allows another request.
    pub async fn wait(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_call_is_immediate() {
        let throttle = Throttle::from_millis(1_000);
        let start = tokio::time::Instant::now();
        throttle.wait().await;
        assert!(start.elapsed() < Duration::from_millis(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_consecutive_calls_are_spaced() {
        let throttle = Throttle::from_millis(500);
        let start = tokio::time::Instant::now();

        throttle.wait().await;
        throttle.wait().await;
        throttle.wait().await;

        assert!(start.elapsed() >= Duration::from_millis(1_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_queue() {
        let throttle = std::sync::Arc::new(Throttle::from_millis(200));
        let start = tokio::time::Instant::now();

        let waiters: Vec<_> = (0..5)
            .map(|_| {
                let throttle = std::sync::Arc::clone(&throttle);
                tokio::spawn(async move {
                    throttle.wait().await;
                    tokio::time::Instant::now()
                })
            })
            .collect();

        let mut finished = Vec::new();
        for waiter in waiters {
            finished.push(waiter.await.unwrap());
        }
        finished.sort();

        assert!(finished[4] - start >= Duration::from_millis(800));
        for pair in finished.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(200));
        }
    }

    #[tokio::test]
    async fn test_zero_interval_never_waits() {
        let throttle = Throttle::from_millis(0);
        let start = std::time::Instant::now();
        for _ in 0..10 {
            throttle.wait().await;
        }
        assert!(start.elapsed() < Duration::from_millis(100));
    }
}
