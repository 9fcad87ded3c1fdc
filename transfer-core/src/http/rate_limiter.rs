//! A sliding-window rate limiter: at most `N` requests may leave in any
//! trailing 1-second window.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

const WINDOW: Duration = Duration::from_secs(1);

/// Gates outgoing requests to a maximum rate per 1-second sliding window.
///
/// Holds a timestamp for every request issued in the last second; a new
/// request waits until the oldest timestamp ages out of the window if the
/// window is already full, then records itself.
pub struct RateLimiter {
    max_per_second: usize,
    timestamps: Mutex<VecDeque<Instant>>,
}
impl RateLimiter {
    #[must_use]
    pub fn new(max_per_second: usize) -> Self { Self { max_per_second, timestamps: Mutex::new(VecDeque::new()) } }

    /// Blocks (asynchronously) until issuing a request now would not exceed
    /// `max_per_second`, then records the request's timestamp.
    ///
    /// # Returns
    /// `true` if the caller had to wait for the window to free up, `false`
    /// if the request was admitted immediately.
    pub async fn acquire(&self) -> bool {
        let mut waited = false;
        loop {
            let wait = {
                let mut timestamps = self.timestamps.lock();
                let now = Instant::now();
                while let Some(&front) = timestamps.front() {
                    if now.duration_since(front) >= WINDOW {
                        timestamps.pop_front();
                    } else {
                        break;
                    }
                }
                if timestamps.len() < self.max_per_second {
                    timestamps.push_back(now);
                    None
                } else {
                    let oldest = *timestamps.front().expect("len >= max_per_second > 0 implies non-empty");
                    Some(WINDOW - now.duration_since(oldest))
                }
            };
            match wait {
                None => return waited,
                Some(duration) => {
                    waited = true;
                    tokio::time::sleep(duration).await;
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn allows_burst_up_to_limit_without_waiting() {
        let limiter = RateLimiter::new(5);
        let started = Instant::now();
        for _ in 0..5 {
            assert!(!limiter.acquire().await);
        }
        assert!(started.elapsed() < Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn reports_whether_it_had_to_wait() {
        let limiter = RateLimiter::new(1);
        assert!(!limiter.acquire().await);
        assert!(limiter.acquire().await);
    }

    #[tokio::test(start_paused = true)]
    async fn blocks_once_window_is_full() {
        let limiter = RateLimiter::new(2);
        limiter.acquire().await;
        limiter.acquire().await;
        let started = Instant::now();
        limiter.acquire().await;
        assert!(Instant::now().duration_since(started) >= Duration::from_millis(900));
    }
}
