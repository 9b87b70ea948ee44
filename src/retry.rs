//! Retrying as a transport adapter.
//!
//! [`RetryAdapter`] wraps another [`Transport`] and re-invokes it on
//! transient failures according to a [`RetryStrategy`] and a
//! [`RetryPredicate`]. It is the outermost layer of the adapter chain, so a
//! retried attempt still goes through the cache adapter underneath it.
//!
//! When retries are exhausted the last underlying error is returned as-is;
//! the caller sees the original failure message, not a wrapper.

use rand::Rng;
use std::time::Duration;

use crate::transport::{BoxFuture, Transport, TransportRequest, TransportResponse};
use crate::{Error, Result};

/// Defines when and how to retry failed requests.
///
/// # Examples
///
/// ```
/// use courier::RetryStrategy;
/// use std::time::Duration;
///
/// // Exponential backoff: 100ms, 200ms, 400ms, 800ms...
/// let exponential = RetryStrategy::ExponentialBackoff {
///     initial_delay: Duration::from_millis(100),
///     max_delay: Duration::from_secs(30),
///     max_retries: 5,
///     jitter: true,
/// };
///
/// // Linear backoff: 1s, 1s, 1s...
/// let linear = RetryStrategy::Linear {
///     delay: Duration::from_secs(1),
///     max_retries: 3,
/// };
/// ```
#[derive(Debug, Clone, Default)]
pub enum RetryStrategy {
    /// Do not retry failed requests.
    #[default]
    None,

    /// Retry with exponentially increasing delays.
    ///
    /// Each retry waits for `initial_delay * 2^attempt` (capped at
    /// `max_delay`). Optional jitter adds randomness to prevent thundering
    /// herd.
    ExponentialBackoff {
        /// The initial delay before the first retry.
        initial_delay: Duration,
        /// The maximum delay between retries.
        max_delay: Duration,
        /// The maximum number of retry attempts.
        max_retries: usize,
        /// Whether to add random jitter to delays (recommended).
        jitter: bool,
    },

    /// Retry with a fixed delay between attempts.
    Linear {
        /// The delay between retry attempts.
        delay: Duration,
        /// The maximum number of retry attempts.
        max_retries: usize,
    },

    /// Custom retry logic.
    ///
    /// Provide a function that takes the attempt number (starting from 1)
    /// and returns `Some(delay)` to retry after the delay, or `None` to stop.
    Custom {
        /// Function that determines retry delay.
        delay_fn: fn(attempt: usize) -> Option<Duration>,
    },
}

impl RetryStrategy {
    /// Returns the delay before the given retry attempt, or `None` if
    /// retries are exhausted.
    ///
    /// `attempt` is 1-indexed, so 1 is the first retry.
    pub fn delay_for_attempt(&self, attempt: usize) -> Option<Duration> {
        match self {
            RetryStrategy::None => None,
            RetryStrategy::ExponentialBackoff {
                initial_delay,
                max_delay,
                max_retries,
                jitter,
            } => {
                if attempt > *max_retries {
                    return None;
                }

                let multiplier = 2u64.saturating_pow(attempt.saturating_sub(1) as u32);
                let base_delay =
                    initial_delay.saturating_mul(multiplier.try_into().unwrap_or(u32::MAX));
                let delay = base_delay.min(*max_delay);

                if *jitter {
                    // Random value between 50% and 100% of the delay.
                    let jitter_factor = rand::thread_rng().gen_range(0.5..=1.0);
                    Some(delay.mul_f64(jitter_factor))
                } else {
                    Some(delay)
                }
            }
            RetryStrategy::Linear { delay, max_retries } => {
                if attempt > *max_retries {
                    None
                } else {
                    Some(*delay)
                }
            }
            RetryStrategy::Custom { delay_fn } => delay_fn(attempt),
        }
    }
}

/// Trait for determining whether a failed request should be retried.
///
/// # Examples
///
/// ```
/// use courier::{Error, RetryPredicate};
///
/// struct RetryOnRateLimit;
///
/// impl RetryPredicate for RetryOnRateLimit {
///     fn should_retry(&self, error: &Error, _attempt: usize) -> bool {
///         error.status_code().map(|s| s.as_u16() == 429).unwrap_or(false)
///     }
/// }
/// ```
pub trait RetryPredicate: Send + Sync {
    /// Determines whether the request should be retried based on the error.
    ///
    /// `attempt` is the attempt number that just failed, 1-indexed.
    fn should_retry(&self, error: &Error, attempt: usize) -> bool;
}

/// Retry all errors that are marked as retryable.
///
/// This uses [`Error::is_retryable`], which returns `true` for connection
/// failures, timeouts, and 5xx or 429 statuses.
#[derive(Debug, Clone, Copy)]
pub struct RetryOnRetryable;

impl RetryPredicate for RetryOnRetryable {
    fn should_retry(&self, error: &Error, _attempt: usize) -> bool {
        error.is_retryable()
    }
}

/// Retry only on 5xx server errors.
#[derive(Debug, Clone, Copy)]
pub struct RetryOn5xx;

impl RetryPredicate for RetryOn5xx {
    fn should_retry(&self, error: &Error, _attempt: usize) -> bool {
        error
            .status_code()
            .map(|s| s.is_server_error())
            .unwrap_or(false)
    }
}

/// Retry only on timeout errors.
#[derive(Debug, Clone, Copy)]
pub struct RetryOnTimeout;

impl RetryPredicate for RetryOnTimeout {
    fn should_retry(&self, error: &Error, _attempt: usize) -> bool {
        matches!(
            error,
            Error::Transport {
                kind: crate::TransportErrorKind::Timeout,
                ..
            }
        )
    }
}

/// Retry only on network/connection errors.
#[derive(Debug, Clone, Copy)]
pub struct RetryOnConnectionError;

impl RetryPredicate for RetryOnConnectionError {
    fn should_retry(&self, error: &Error, _attempt: usize) -> bool {
        matches!(
            error,
            Error::Transport {
                kind: crate::TransportErrorKind::Connect,
                ..
            }
        )
    }
}

/// Combine multiple retry predicates with OR logic.
///
/// Retries if ANY of the predicates return `true`.
pub struct OrPredicate {
    predicates: Vec<Box<dyn RetryPredicate>>,
}

impl OrPredicate {
    /// Creates a new `OrPredicate` from a list of predicates.
    pub fn new(predicates: Vec<Box<dyn RetryPredicate>>) -> Self {
        Self { predicates }
    }
}

impl RetryPredicate for OrPredicate {
    fn should_retry(&self, error: &Error, attempt: usize) -> bool {
        self.predicates
            .iter()
            .any(|p| p.should_retry(error, attempt))
    }
}

/// Combine multiple retry predicates with AND logic.
///
/// Retries only if ALL of the predicates return `true`.
pub struct AndPredicate {
    predicates: Vec<Box<dyn RetryPredicate>>,
}

impl AndPredicate {
    /// Creates a new `AndPredicate` from a list of predicates.
    pub fn new(predicates: Vec<Box<dyn RetryPredicate>>) -> Self {
        Self { predicates }
    }
}

impl RetryPredicate for AndPredicate {
    fn should_retry(&self, error: &Error, attempt: usize) -> bool {
        self.predicates
            .iter()
            .all(|p| p.should_retry(error, attempt))
    }
}

/// Configuration for the retry adapter.
pub struct RetryOptions {
    /// When and how long to wait between attempts.
    pub strategy: RetryStrategy,
    /// Which failures are worth another attempt.
    pub predicate: Box<dyn RetryPredicate>,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            strategy: RetryStrategy::ExponentialBackoff {
                initial_delay: Duration::from_millis(100),
                max_delay: Duration::from_secs(10),
                max_retries: 3,
                jitter: true,
            },
            predicate: Box::new(RetryOnRetryable),
        }
    }
}

/// A decorator transport that re-invokes the wrapped transport on transient
/// failures.
pub struct RetryAdapter {
    inner: Box<dyn Transport>,
    options: RetryOptions,
}

impl RetryAdapter {
    /// Wraps `inner` with retry behavior configured by `options`.
    pub fn new(inner: impl Transport + 'static, options: RetryOptions) -> Self {
        Self {
            inner: Box::new(inner),
            options,
        }
    }
}

impl Transport for RetryAdapter {
    fn send(&self, request: TransportRequest) -> BoxFuture<'_, Result<TransportResponse>> {
        Box::pin(async move {
            let mut attempt = 0;

            loop {
                attempt += 1;

                let error = match self.inner.send(request.clone()).await {
                    Ok(response) => return Ok(response),
                    Err(e) => e,
                };

                tracing::warn!(
                    error = %error,
                    attempt = attempt,
                    correlation_id = %request.correlation_id,
                    "transport attempt failed"
                );

                if !self.options.predicate.should_retry(&error, attempt) {
                    return Err(error);
                }

                match self.options.strategy.delay_for_attempt(attempt) {
                    Some(delay) => {
                        tracing::debug!(
                            delay_ms = delay.as_millis() as u64,
                            attempt = attempt,
                            correlation_id = %request.correlation_id,
                            "retrying request after delay"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    None => return Err(error),
                }
            }
        })
    }
}
