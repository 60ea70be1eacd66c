//! Cooperative cancellation for in-progress operations.

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

/// A cloneable cancellation signal.
///
/// The transport checks the token before every attempt and waits on it
/// during retry backoff, so cancelling wakes a sleeping retry loop at once.
/// In-flight HTTP calls are bounded by the agent timeout, not by the token.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancelToken {
    /// Create a token that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire the signal, waking every waiter.
    pub fn cancel(&self) {
        let (lock, cvar) = &*self.inner;
        let mut cancelled = lock.lock().unwrap_or_else(PoisonError::into_inner);
        *cancelled = true;
        cvar.notify_all();
    }

    /// Whether the signal has fired.
    pub fn is_cancelled(&self) -> bool {
        let (lock, _) = &*self.inner;
        *lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleep for `timeout` unless cancelled first.
    ///
    /// Returns `true` if the token was cancelled before or during the wait.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let (guard, _) = cvar
            .wait_timeout_while(guard, timeout, |cancelled| !*cancelled)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }
}
