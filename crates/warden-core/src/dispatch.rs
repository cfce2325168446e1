// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Serialized dispatch for external service calls.
//!
//! All embedding and model calls pass through one [`CallQueue`]. The queue
//! hands out start slots at least `min_spacing` apart and retries
//! rate-limited calls with exponential backoff. The slot lock is released
//! before the call itself is awaited.

use std::future::Future;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::WardenError;

/// In-process queue that spaces and retries calls to external backends.
#[derive(Debug)]
pub struct CallQueue {
    /// Start time reserved for the most recent call.
    last_slot: Mutex<Option<Instant>>,
    min_spacing: Duration,
    max_retries: u32,
    base_backoff: Duration,
}

impl CallQueue {
    /// Create a queue with the given spacing and retry policy.
    pub fn new(min_spacing: Duration, max_retries: u32, base_backoff: Duration) -> Self {
        Self {
            last_slot: Mutex::new(None),
            min_spacing,
            max_retries,
            base_backoff,
        }
    }

    /// A queue with no spacing and no retries (useful in tests).
    pub fn unthrottled() -> Self {
        Self::new(Duration::ZERO, 0, Duration::ZERO)
    }

    /// Run `call`, waiting for a dispatch slot before every attempt.
    ///
    /// Only [`WardenError::RateLimited`] is retried. The delay for attempt `n`
    /// is `base_backoff * 2^n`, or the server's `retry_after` when larger.
    pub async fn run<T, F, Fut>(&self, label: &str, mut call: F) -> Result<T, WardenError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, WardenError>>,
    {
        let mut attempt: u32 = 0;
        loop {
            self.wait_for_slot().await;
            match call().await {
                Err(WardenError::RateLimited { retry_after }) if attempt < self.max_retries => {
                    let backoff = self.backoff_for(attempt, retry_after);
                    warn!(
                        call = label,
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        "rate limited, backing off"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    /// Backoff before retrying after `attempt` failed attempts.
    pub fn backoff_for(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let exp = self
            .base_backoff
            .saturating_mul(2u32.saturating_pow(attempt.min(16)));
        match retry_after {
            Some(hint) if hint > exp => hint,
            _ => exp,
        }
    }

    async fn wait_for_slot(&self) {
        let start_at = {
            let mut last = self.last_slot.lock().await;
            let now = Instant::now();
            let slot = match *last {
                Some(prev) if prev + self.min_spacing > now => prev + self.min_spacing,
                _ => now,
            };
            *last = Some(slot);
            slot
        };
        let now = Instant::now();
        if start_at > now {
            debug!(wait_ms = (start_at - now).as_millis() as u64, "waiting for dispatch slot");
            tokio::time::sleep_until(start_at).await;
        }
    }
}

impl Default for CallQueue {
    fn default() -> Self {
        Self::new(Duration::from_millis(250), 3, Duration::from_millis(500))
    }
}
