//! Bounded retry with a fixed delay and a per-attempt deadline.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Failure, ResilienceError};

/// Configuration for a [`RetryExecutor`].
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total number of attempts, including the first. Zero is treated as one.
    pub max_attempts: u32,
    /// Constant pause between a failed attempt and the next one.
    pub delay: Duration,
    /// Deadline applied to each attempt independently.
    pub attempt_timeout: Option<Duration>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
            attempt_timeout: Some(Duration::from_secs(5)),
        }
    }
}

/// Per-call bookkeeping, discarded once the call resolves.
#[derive(Debug)]
struct RetryContext {
    attempt: u32,
    max_attempts: u32,
}

impl RetryContext {
    fn new(config: &RetryConfig) -> Self {
        Self {
            attempt: 0,
            max_attempts: config.max_attempts.max(1),
        }
    }

    fn begin_attempt(&mut self) -> u32 {
        self.attempt += 1;
        self.attempt
    }

    fn has_attempts_left(&self) -> bool {
        self.attempt < self.max_attempts
    }
}

/// Re-invokes a fallible call until it succeeds or the attempt cap is hit.
///
/// No backoff growth and no jitter: every retry waits exactly `delay`.
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    name: Arc<str>,
    config: Arc<RetryConfig>,
}

impl RetryExecutor {
    /// Creates an executor; `name` labels its logs and metrics.
    pub fn new(name: impl Into<Arc<str>>, config: RetryConfig) -> Self {
        Self {
            name: name.into(),
            config: Arc::new(config),
        }
    }

    /// The executor name used in logs and metrics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The configuration this executor was built with.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Runs `op`, retrying on error or on exceeding the per-attempt deadline.
    ///
    /// A timed-out attempt is abandoned (its future dropped) and consumes
    /// one attempt. After the last failed attempt, returns `Exhausted`
    /// carrying that attempt's cause.
    pub async fn call<F, Fut, T, E>(&self, mut op: F) -> Result<T, ResilienceError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut ctx = RetryContext::new(&self.config);

        loop {
            let attempt = ctx.begin_attempt();

            let outcome = match self.config.attempt_timeout {
                Some(limit) => match tokio::time::timeout(limit, op()).await {
                    Ok(result) => result.map_err(Failure::Inner),
                    Err(_) => Err(Failure::Timeout(limit)),
                },
                None => op().await.map_err(Failure::Inner),
            };

            let failure = match outcome {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::info!(executor = %self.name, attempt, "call succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(failure) => failure,
            };

            metrics::counter!("retry_attempts_failed_total", "executor" => self.name.to_string())
                .increment(1);

            if !ctx.has_attempts_left() {
                metrics::counter!("retry_exhausted_total", "executor" => self.name.to_string())
                    .increment(1);
                tracing::error!(
                    executor = %self.name,
                    attempts = attempt,
                    error = %failure,
                    "retries exhausted"
                );
                return Err(ResilienceError::Exhausted {
                    attempts: attempt,
                    last: failure,
                });
            }

            tracing::warn!(
                executor = %self.name,
                attempt,
                max_attempts = ctx.max_attempts,
                delay_ms = self.config.delay.as_millis() as u64,
                error = %failure,
                "attempt failed, retrying"
            );
            tokio::time::sleep(self.config.delay).await;
        }
    }
}
