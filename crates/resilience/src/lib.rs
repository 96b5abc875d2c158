//! Fault-tolerance primitives for calls to unreliable dependencies.
//!
//! - [`CircuitBreaker`] isolates a failing dependency by rejecting calls
//!   for a cooldown period after repeated failures.
//! - [`RetryExecutor`] re-invokes a call a bounded number of times with a
//!   fixed delay and a per-attempt deadline.
//! - [`FireAndForget`] runs a call on its own task and only logs its outcome.
//!
//! All three are generic over any fallible async call and are composed
//! explicitly by callers rather than nested inside each other.

pub mod circuit_breaker;
pub mod dispatch;
pub mod error;
pub mod retry;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use dispatch::{DispatchConfig, DispatchStats, FireAndForget};
pub use error::{Failure, ResilienceError};
pub use retry::{RetryConfig, RetryExecutor};
