//! Fixed-interval retry. Every failure is retried until success, exhaustion or shutdown.

use std::{fmt, future::Future, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time;
use tracing::*;

use crate::ShutdownSignal;

/// Longest single sleep between shutdown checks.
const SHUTDOWN_POLL: Duration = Duration::from_millis(250);

/// Fixed-delay retry policy. No backoff growth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Delay between attempts, in milliseconds.
    pub interval_ms: u64,

    /// Attempt ceiling. `None` retries until success or shutdown.
    #[serde(default)]
    pub max_attempts: Option<u32>,
}

impl RetryConfig {
    pub const fn unbounded(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            max_attempts: None,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Whether another attempt is allowed after `attempts` have failed.
    pub fn should_retry(&self, attempts: u32) -> bool {
        self.max_attempts.is_none_or(|max| attempts < max)
    }
}

#[derive(Debug, Error)]
pub enum RetryError<E> {
    #[error("shutdown requested")]
    Shutdown,

    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: E },
}

/// Sleeps for `duration`, waking early if shutdown is requested.
///
/// Returns `false` if the sleep was cut short by shutdown.
pub async fn sleep_unless_shutdown<S>(duration: Duration, shutdown: &S) -> bool
where
    S: ShutdownSignal + ?Sized,
{
    let mut remaining = duration;
    while !remaining.is_zero() {
        if shutdown.should_shutdown() {
            return false;
        }
        let step = remaining.min(SHUTDOWN_POLL);
        time::sleep(step).await;
        remaining -= step;
    }
    !shutdown.should_shutdown()
}

/// Runs `op` until it succeeds, exhausts the policy or shutdown is requested.
pub async fn retry_fixed<T, E, F, Fut, S>(
    config: &RetryConfig,
    shutdown: &S,
    operation: &str,
    mut op: F,
) -> Result<T, RetryError<E>>
where
    E: fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    S: ShutdownSignal + ?Sized,
{
    let mut attempts: u32 = 0;
    loop {
        if shutdown.should_shutdown() {
            return Err(RetryError::Shutdown);
        }

        attempts += 1;
        let err = match op().await {
            Ok(value) => {
                if attempts > 1 {
                    debug!(%operation, %attempts, "succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) => err,
        };

        if !config.should_retry(attempts) {
            error!(%operation, %attempts, %err, "retry attempts exhausted");
            return Err(RetryError::Exhausted {
                attempts,
                last: err,
            });
        }

        warn!(%operation, %attempts, %err, retry_in_ms = config.interval_ms, "attempt failed");
        if !sleep_unless_shutdown(config.interval(), shutdown).await {
            return Err(RetryError::Shutdown);
        }
    }
}
