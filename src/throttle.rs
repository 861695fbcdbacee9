//! Outbound request pacing for the external AI endpoint.
//!
//! Two simultaneous constraints: a minimum delay between consecutive calls
//! and a maximum call count within any rolling 60 second window. One shared
//! instance paces every outbound embedding and generation call in the
//! process.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

const WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug)]
struct RateWindow {
    last_request: Option<Instant>,
    window_start: Instant,
    count_in_window: u32,
}

pub struct RequestThrottler {
    min_delay: Duration,
    max_per_minute: u32,
    window: Mutex<RateWindow>,
}

impl RequestThrottler {
    pub fn new(min_delay_ms: u64, max_per_minute: u32) -> Self {
        Self {
            min_delay: Duration::from_millis(min_delay_ms),
            max_per_minute: max_per_minute.max(1),
            window: Mutex::new(RateWindow {
                last_request: None,
                window_start: Instant::now(),
                count_in_window: 0,
            }),
        }
    }

    /// Suspends the caller until the next outbound call is allowed, then
    /// records it. Never fails, only waits.
    ///
    /// The lock is held across the sleeps, so concurrent callers serialize
    /// in suspension order. The per-minute cap is checked before the
    /// per-call delay: a caller near the minute boundary pays at most one
    /// wait, not two overlapping ones.
    pub async fn acquire(&self) {
        let mut window = self.window.lock().await;

        let now = Instant::now();
        if now.duration_since(window.window_start) > WINDOW {
            window.count_in_window = 0;
            window.window_start = now;
        }

        if window.count_in_window >= self.max_per_minute {
            let elapsed = Instant::now().duration_since(window.window_start);
            if elapsed < WINDOW {
                sleep(WINDOW - elapsed).await;
            }
            window.count_in_window = 0;
            window.window_start = Instant::now();
        }

        if let Some(last) = window.last_request {
            let elapsed = Instant::now().duration_since(last);
            if elapsed < self.min_delay {
                sleep(self.min_delay - elapsed).await;
            }
        }

        window.last_request = Some(Instant::now());
        window.count_in_window += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn sixth_call_waits_for_second_window() {
        let throttler = RequestThrottler::new(0, 5);
        let start = Instant::now();

        for _ in 0..6 {
            throttler.acquire().await;
        }

        // The first five pass immediately; the sixth must wait out the
        // remainder of the window.
        assert!(start.elapsed() >= Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn min_delay_paces_consecutive_calls() {
        let throttler = RequestThrottler::new(100, 1_000);
        let start = Instant::now();

        for _ in 0..3 {
            throttler.acquire().await;
        }

        // First call is free, the next two each wait 100ms.
        assert!(start.elapsed() >= Duration::from_millis(200));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn window_resets_after_sixty_seconds_idle() {
        let throttler = RequestThrottler::new(0, 2);

        throttler.acquire().await;
        throttler.acquire().await;

        sleep(Duration::from_secs(61)).await;

        let start = Instant::now();
        throttler.acquire().await;
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_serialize() {
        let throttler = std::sync::Arc::new(RequestThrottler::new(50, 1_000));
        let start = Instant::now();

        let mut handles = Vec::new();
        for _ in 0..4 {
            let throttler = throttler.clone();
            handles.push(tokio::spawn(async move {
                throttler.acquire().await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert!(start.elapsed() >= Duration::from_millis(150));
    }
}
