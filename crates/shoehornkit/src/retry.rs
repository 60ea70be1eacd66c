//! Retry logic with linear backoff for transient errors.

use crate::cancel::CancelToken;
use crate::error::{Error, Result};
use crate::types::RetryConfig;
use std::time::Duration;

/// Callback trait for retry progress notifications.
pub trait RetryCallback: Send + Sync {
    /// Called before waiting for the next attempt.
    ///
    /// # Arguments
    /// * `attempt` - Attempt that just failed (1-indexed)
    /// * `max_attempts` - Maximum number of attempts
    /// * `error` - The error that triggered the retry
    /// * `delay` - Wait before the next attempt
    fn on_retry(&self, attempt: u32, max_attempts: u32, error: &Error, delay: Duration);
}

/// No-op callback that does nothing.
pub struct NoCallback;

impl RetryCallback for NoCallback {
    fn on_retry(&self, _attempt: u32, _max_attempts: u32, _error: &Error, _delay: Duration) {}
}

/// Callback that reports retries through the `log` facade.
pub struct LogCallback;

impl RetryCallback for LogCallback {
    fn on_retry(&self, attempt: u32, max_attempts: u32, error: &Error, delay: Duration) {
        log::warn!(
            "Attempt {}/{} failed: {}. Retrying in {}ms...",
            attempt,
            max_attempts,
            error,
            delay.as_millis()
        );
    }
}

/// Execute an operation with retry logic.
///
/// Retries the operation while it returns a retryable error. Cancellation is
/// checked before the first attempt and raced against every backoff wait.
///
/// # Returns
/// The result of the operation, the first non-retryable error, or
/// [`Error::RetriesExhausted`] wrapping the last failure.
pub fn with_retry<T, F>(
    config: &RetryConfig,
    callback: &dyn RetryCallback,
    cancel: &CancelToken,
    mut operation: F,
) -> Result<T>
where
    F: FnMut(u32) -> Result<T>,
{
    let max_attempts = config.max_attempts.max(1);

    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }

    let mut attempt = 0;
    loop {
        let err = match operation(attempt) {
            Ok(result) => return Ok(result),
            Err(e) => e,
        };

        if !err.is_retryable() {
            return Err(err);
        }

        attempt += 1;
        if attempt >= max_attempts {
            return Err(Error::RetriesExhausted {
                attempts: max_attempts,
                source: Box::new(err),
            });
        }

        let delay = config.delay_for_attempt(attempt);
        callback.on_retry(attempt, max_attempts, &err, delay);

        if cancel.wait_timeout(delay) {
            return Err(Error::Cancelled);
        }
    }
}
