//! Shared backoff retry logic for completion providers.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use backoff::ExponentialBackoff;
use backoff::backoff::Backoff;
use tracing::{debug, error, info};

/// Configuration: 6 total attempts, waits of 1, 2, 4, 8, 16 and 32 seconds.
pub const MAX_ATTEMPTS: u32 = 6;
const INITIAL_INTERVAL_SECS: u64 = 1;
const MAX_INTERVAL_SECS: u64 = 32;
const MULTIPLIER: f64 = 2.0;

/// The fixed wait schedule.
///
/// Zero randomization makes the exponential backoff deterministic: each call
/// to `next_backoff` doubles the previous wait, starting at one second.
pub fn backoff_schedule() -> ExponentialBackoff {
    let initial = Duration::from_secs(INITIAL_INTERVAL_SECS);
    ExponentialBackoff {
        current_interval: initial,
        initial_interval: initial,
        randomization_factor: 0.0,
        multiplier: MULTIPLIER,
        max_interval: Duration::from_secs(MAX_INTERVAL_SECS),
        max_elapsed_time: None,
        ..Default::default()
    }
}

/// Retry an async operation with the fixed backoff schedule.
///
/// `attempt` is called up to `MAX_ATTEMPTS` times. A failure for which
/// `is_fatal` returns true is handed back immediately. Any other failure
/// suspends the task for the next wait in the schedule and tries again.
///
/// `wrap_exhausted` converts the last error into the appropriate
/// `RetriesExhausted` variant for the caller's error type.
pub async fn retry_with_backoff<T, E, Fut, F, P, W>(
    mut attempt: F,
    is_fatal: P,
    wrap_exhausted: W,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    W: FnOnce(E) -> E,
    E: Display,
{
    let mut backoff = backoff_schedule();
    let mut attempts = 0;

    loop {
        attempts += 1;
        debug!(attempt = attempts, max_attempts = MAX_ATTEMPTS, "Sending request");

        let err = match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        if is_fatal(&err) {
            return Err(err);
        }

        error!(attempt = attempts, "{}", err);

        if attempts >= MAX_ATTEMPTS {
            return Err(wrap_exhausted(err));
        }

        let wait = backoff
            .next_backoff()
            .unwrap_or(Duration::from_secs(MAX_INTERVAL_SECS));
        info!("Retry in {}s..", wait.as_secs());
        tokio::time::sleep(wait).await;
    }
}
