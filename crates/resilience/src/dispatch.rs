//! Fire-and-forget dispatch of best-effort work.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::FutureExt;
use tracing::Instrument;

use crate::error::Failure;

/// Configuration for a [`FireAndForget`] dispatcher.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Deadline for a dispatched task; exceeding it counts as a failure.
    pub timeout: Option<Duration>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(5)),
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    dispatched: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
}

/// Snapshot of a dispatcher's outcome counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchStats {
    pub dispatched: u64,
    pub succeeded: u64,
    pub failed: u64,
}

impl DispatchStats {
    /// Number of dispatched tasks that have finished, either way.
    pub fn settled(&self) -> u64 {
        self.succeeded + self.failed
    }

    /// Number of dispatched tasks still running.
    pub fn in_flight(&self) -> u64 {
        self.dispatched.saturating_sub(self.settled())
    }
}

/// Runs work on its own task without the caller waiting for, or ever
/// seeing, the outcome.
///
/// A single attempt is made. Errors, timeouts and panics are caught at the
/// task boundary, logged and counted; nothing is propagated back.
#[derive(Debug, Clone)]
pub struct FireAndForget {
    name: Arc<str>,
    config: Arc<DispatchConfig>,
    counters: Arc<Counters>,
}

impl FireAndForget {
    /// Creates a dispatcher; `name` labels its logs and metrics.
    pub fn new(name: impl Into<Arc<str>>, config: DispatchConfig) -> Self {
        Self {
            name: name.into(),
            config: Arc::new(config),
            counters: Arc::new(Counters::default()),
        }
    }

    /// The dispatcher name used in logs and metrics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current outcome counters.
    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            dispatched: self.counters.dispatched.load(Ordering::SeqCst),
            succeeded: self.counters.succeeded.load(Ordering::SeqCst),
            failed: self.counters.failed.load(Ordering::SeqCst),
        }
    }

    /// Schedules `task` and returns immediately.
    ///
    /// The task inherits the caller's tracing span. Outside a Tokio runtime
    /// the task cannot be scheduled; that is logged and counted as a failure.
    pub fn dispatch<Fut, E>(&self, task: Fut)
    where
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: std::fmt::Display + Send + 'static,
    {
        self.counters.dispatched.fetch_add(1, Ordering::SeqCst);

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            self.settle(Outcome::Failed);
            tracing::warn!(dispatcher = %self.name, "no runtime available, task dropped");
            return;
        };

        let this = self.clone();
        let timeout = self.config.timeout;
        let guarded = async move {
            match timeout {
                Some(limit) => match tokio::time::timeout(limit, task).await {
                    Ok(result) => result.map_err(Failure::Inner),
                    Err(_) => Err(Failure::Timeout(limit)),
                },
                None => task.await.map_err(Failure::Inner),
            }
        };

        handle.spawn(
            async move {
                match AssertUnwindSafe(guarded).catch_unwind().await {
                    Ok(Ok(())) => {
                        this.settle(Outcome::Succeeded);
                        tracing::debug!(dispatcher = %this.name, "dispatched task completed");
                    }
                    Ok(Err(failure)) => {
                        this.settle(Outcome::Failed);
                        tracing::warn!(
                            dispatcher = %this.name,
                            error = %failure,
                            "dispatched task failed (ignored)"
                        );
                    }
                    Err(_) => {
                        this.settle(Outcome::Failed);
                        tracing::warn!(dispatcher = %this.name, "dispatched task panicked (ignored)");
                    }
                }
            }
            .instrument(tracing::Span::current()),
        );
    }

    fn settle(&self, outcome: Outcome) {
        let counter = match outcome {
            Outcome::Succeeded => &self.counters.succeeded,
            Outcome::Failed => &self.counters.failed,
        };
        counter.fetch_add(1, Ordering::SeqCst);
        metrics::counter!(
            "dispatch_total",
            "dispatcher" => self.name.to_string(),
            "outcome" => outcome.as_str()
        )
        .increment(1);
    }
}

#[derive(Debug, Clone, Copy)]
enum Outcome {
    Succeeded,
    Failed,
}

impl Outcome {
    fn as_str(&self) -> &'static str {
        match self {
            Outcome::Succeeded => "succeeded",
            Outcome::Failed => "failed",
        }
    }
}
