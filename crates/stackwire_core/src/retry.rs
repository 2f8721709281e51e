//! Timeout and retry handling for remote calls.
//!
//! Read-only calls go through [`RetryPolicy::run_read`], which retries
//! transient failures with backoff. Mutating calls go through
//! [`RetryPolicy::run_once`]: they get the timeout but are never repeated,
//! because the remote side may already have acted on the first request.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use crate::error::CoreError;

/// Errors that can tell whether repeating the call might succeed.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

impl Retryable for CoreError {
    fn is_retryable(&self) -> bool {
        CoreError::is_retryable(self)
    }
}

/// Delay between attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// Retry immediately.
    Immediate,
    /// Same delay before every retry.
    Fixed(Duration),
    /// Doubling delay starting at `initial`, capped at `max`.
    Exponential { initial: Duration, max: Duration },
}

impl Backoff {
    /// Delay before retry number `retry` (0-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        match self {
            Backoff::Immediate => Duration::ZERO,
            Backoff::Fixed(delay) => *delay,
            Backoff::Exponential { initial, max } => {
                let factor = 2u32.saturating_pow(retry.min(16));
                initial.saturating_mul(factor).min(*max)
            }
        }
    }
}

/// Bounded retry policy with a per-attempt timeout.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    timeout: Duration,
    backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(4)
    }
}

impl RetryPolicy {
    /// Create a policy making at most `max_attempts` attempts (at least one).
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            timeout: Duration::from_secs(30),
            backoff: Backoff::Exponential {
                initial: Duration::from_millis(200),
                max: Duration::from_secs(5),
            },
        }
    }

    /// Single attempt, no timeout. Used where callers want plain pass-through.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            timeout: Duration::ZERO,
            backoff: Backoff::Immediate,
        }
    }

    /// Per-attempt timeout; `Duration::ZERO` disables it.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run an idempotent read, retrying transient failures.
    pub async fn run_read<T, E, F, Fut>(&self, operation: &str, mut call: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + From<CoreError> + std::fmt::Display,
    {
        let mut attempt = 1;
        loop {
            match self.attempt(operation, call()).await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!("{} succeeded on attempt {}", operation, attempt);
                    }
                    return Ok(value);
                }
                Err(err) if err.is_retryable() && attempt < self.max_attempts => {
                    let delay = self.backoff.delay_for(attempt - 1);
                    warn!(
                        "{} failed on attempt {}/{}: {}; retrying in {:?}",
                        operation, attempt, self.max_attempts, err, delay
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Run a mutating call exactly once, bounded by the timeout.
    pub async fn run_once<T, E, Fut>(&self, operation: &str, call: Fut) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
        E: From<CoreError>,
    {
        self.attempt(operation, call).await
    }

    async fn attempt<T, E, Fut>(&self, operation: &str, call: Fut) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
        E: From<CoreError>,
    {
        if self.timeout.is_zero() {
            return call.await;
        }
        match timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(CoreError::Timeout {
                operation: operation.to_string(),
                timeout: self.timeout,
            }
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug)]
    enum TestError {
        Transient,
        Fatal,
        Core(CoreError),
    }

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{:?}", self)
        }
    }

    impl From<CoreError> for TestError {
        fn from(err: CoreError) -> Self {
            TestError::Core(err)
        }
    }

    impl Retryable for TestError {
        fn is_retryable(&self) -> bool {
            match self {
                TestError::Transient => true,
                TestError::Fatal => false,
                TestError::Core(e) => e.is_retryable(),
            }
        }
    }

    fn fast_policy(attempts: u32) -> RetryPolicy {
        RetryPolicy::new(attempts).with_backoff(Backoff::Fixed(Duration::from_millis(1)))
    }

    #[test]
    fn test_exponential_backoff_is_capped() {
        let backoff = Backoff::Exponential {
            initial: Duration::from_millis(100),
            max: Duration::from_millis(500),
        };
        assert_eq!(backoff.delay_for(0), Duration::from_millis(100));
        assert_eq!(backoff.delay_for(1), Duration::from_millis(200));
        assert_eq!(backoff.delay_for(2), Duration::from_millis(400));
        assert_eq!(backoff.delay_for(3), Duration::from_millis(500));
        assert_eq!(backoff.delay_for(40), Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<u32, TestError> = fast_policy(3)
            .run_read("describe", || async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 {
                    Err(TestError::Transient)
                } else {
                    Ok(n)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_attempts_are_bounded() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), TestError> = fast_policy(2)
            .run_read("describe", || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(TestError::Transient)
            })
            .await;

        assert!(matches!(result, Err(TestError::Transient)));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fatal_failure_is_not_retried() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), TestError> = fast_policy(5)
            .run_read("describe", || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(TestError::Fatal)
            })
            .await;

        assert!(matches!(result, Err(TestError::Fatal)));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_timeout_is_reported() {
        let policy = RetryPolicy::new(1).with_timeout(Duration::from_millis(10));
        let result: Result<(), TestError> = policy
            .run_once("create stack", async {
                sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;

        match result {
            Err(TestError::Core(CoreError::Timeout { operation, timeout })) => {
                assert_eq!(operation, "create stack");
                assert_eq!(timeout, Duration::from_millis(10));
            }
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[test]
    fn test_sub_second_timeout_message() {
        let err = CoreError::Timeout {
            operation: "upload function".to_string(),
            timeout: Duration::from_millis(250),
        };
        assert_eq!(err.to_string(), "upload function timed out after 250ms");
    }
}
