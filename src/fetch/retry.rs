//! Bounded retries with exponential backoff for remote operations.

use crate::error::ValidationError;
use crate::fetch::error::FetchError;
use log::{debug, warn};
use std::error::Error as StdError;
use std::num::NonZeroU32;
use std::time::Duration;

/// Classifies a failure as worth retrying or not.
pub trait Transient {
    /// `true` when a later attempt may succeed (timeouts, connection resets,
    /// throttling, server errors).
    fn is_transient(&self) -> bool;
}

/// Suspends the current thread between attempts.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] backed by [`std::thread::sleep`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// How often and how patiently an operation is retried.
///
/// After the r-th failed attempt the fetcher waits `initial_delay * 2^(r-1)`.
///
/// ```
/// use rasterharvest::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new(3, Duration::from_secs(2)).unwrap();
/// assert_eq!(policy.delay_before_retry(1), Duration::from_secs(2));
/// assert_eq!(policy.delay_before_retry(2), Duration::from_secs(4));
///
/// assert!(RetryPolicy::new(0, Duration::ZERO).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: NonZeroU32,
    initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: NonZeroU32::MIN.saturating_add(2),
            initial_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Result<Self, ValidationError> {
        let max_attempts =
            NonZeroU32::new(max_attempts).ok_or(ValidationError::InvalidRetryPolicy)?;
        Ok(Self {
            max_attempts,
            initial_delay,
        })
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts.get()
    }

    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    /// Delay to wait after the `failed_attempt`-th failure (1-based).
    pub fn delay_before_retry(&self, failed_attempt: u32) -> Duration {
        let exponent = failed_attempt.saturating_sub(1).min(31);
        self.initial_delay.saturating_mul(1u32 << exponent)
    }
}

/// Runs fallible operations under a [`RetryPolicy`].
pub struct RetryingFetcher<'a> {
    policy: RetryPolicy,
    sleeper: &'a dyn Sleeper,
}

impl<'a> RetryingFetcher<'a> {
    pub fn new(policy: RetryPolicy, sleeper: &'a dyn Sleeper) -> Self {
        Self { policy, sleeper }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Calls `operation` until it succeeds, fails permanently or the policy's
    /// attempts are used up.
    ///
    /// # Errors
    ///
    /// [`FetchError::Permanent`] as soon as an attempt fails with a
    /// non-transient error, [`FetchError::Exhausted`] with the last cause once
    /// every attempt failed.
    pub fn attempt<T, E, F>(&self, description: &str, mut operation: F) -> Result<T, FetchError<E>>
    where
        E: StdError + Transient + 'static,
        F: FnMut() -> Result<T, E>,
    {
        let max_attempts = self.policy.max_attempts();
        let mut attempt = 1;
        loop {
            match operation() {
                Ok(value) => {
                    if attempt > 1 {
                        debug!("{} succeeded on attempt {}", description, attempt);
                    }
                    return Ok(value);
                }
                Err(e) if !e.is_transient() => {
                    warn!(
                        "{} failed on attempt {} with a permanent error: {}",
                        description, attempt, e
                    );
                    return Err(FetchError::Permanent {
                        description: description.to_string(),
                        attempt,
                        source: e,
                    });
                }
                Err(e) if attempt >= max_attempts => {
                    warn!(
                        "{} failed on attempt {}/{}, giving up: {}",
                        description, attempt, max_attempts, e
                    );
                    return Err(FetchError::Exhausted {
                        description: description.to_string(),
                        attempts: attempt,
                        source: e,
                    });
                }
                Err(e) => {
                    let delay = self.policy.delay_before_retry(attempt);
                    warn!(
                        "{} failed on attempt {}/{}: {}. Retrying in {:?}",
                        description, attempt, max_attempts, e, delay
                    );
                    self.sleeper.sleep(delay);
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingSleeper;
    use std::cell::Cell;
    use thiserror::Error;

    #[derive(Debug, Error)]
    #[error("flaky: {0}")]
    struct Flaky(bool);

    impl Transient for Flaky {
        fn is_transient(&self) -> bool {
            self.0
        }
    }

    #[test]
    fn test_backoff_doubles_between_attempts() {
        let sleeper = RecordingSleeper::default();
        let policy = RetryPolicy::new(3, Duration::from_secs(2)).unwrap();
        let fetcher = RetryingFetcher::new(policy, &sleeper);
        let calls = Cell::new(0);

        let result = fetcher.attempt("list collections", || {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err(Flaky(true))
            } else {
                Ok("ok")
            }
        });

        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.get(), 3);
        assert_eq!(
            sleeper.recorded(),
            vec![Duration::from_secs(2), Duration::from_secs(4)]
        );
    }

    #[test]
    fn test_exhausted_after_exactly_max_attempts() {
        let sleeper = RecordingSleeper::default();
        let policy = RetryPolicy::new(5, Duration::from_millis(10)).unwrap();
        let fetcher = RetryingFetcher::new(policy, &sleeper);
        let calls = Cell::new(0);

        let result: Result<(), _> = fetcher.attempt("search", || {
            calls.set(calls.get() + 1);
            Err(Flaky(true))
        });

        assert_eq!(calls.get(), 5);
        match result {
            Err(FetchError::Exhausted { attempts, .. }) => assert_eq!(attempts, 5),
            other => panic!("expected exhausted error, got {:?}", other),
        }
        assert_eq!(sleeper.recorded().len(), 4);
    }

    #[test]
    fn test_permanent_error_is_not_retried() {
        let sleeper = RecordingSleeper::default();
        let fetcher = RetryingFetcher::new(RetryPolicy::default(), &sleeper);
        let calls = Cell::new(0);

        let result: Result<(), _> = fetcher.attempt("search", || {
            calls.set(calls.get() + 1);
            Err(Flaky(false))
        });

        assert_eq!(calls.get(), 1);
        assert!(matches!(result, Err(FetchError::Permanent { attempt: 1, .. })));
        assert!(sleeper.recorded().is_empty());
    }

    #[test]
    fn test_first_success_does_not_sleep() {
        let sleeper = RecordingSleeper::default();
        let fetcher = RetryingFetcher::new(RetryPolicy::default(), &sleeper);
        let result: Result<u8, FetchError<Flaky>> = fetcher.attempt("noop", || Ok(7));
        assert_eq!(result.unwrap(), 7);
        assert!(sleeper.recorded().is_empty());
    }
}
