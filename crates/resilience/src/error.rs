//! Error types shared by the resilience primitives.
//!
//! Both types are generic over the wrapped call's own error `E`, so callers
//! keep the original cause instead of a stringly-typed copy.

use std::time::Duration;

use thiserror::Error;

/// Why a single guarded invocation failed.
#[derive(Debug, Error)]
pub enum Failure<E> {
    /// The invocation did not finish within its deadline.
    #[error("timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
    /// The invocation returned an error.
    #[error("{0}")]
    Inner(#[source] E),
}

impl<E> Failure<E> {
    /// Returns the wrapped call's error, if the failure was not a timeout.
    pub fn inner(&self) -> Option<&E> {
        match self {
            Failure::Inner(e) => Some(e),
            Failure::Timeout(_) => None,
        }
    }

    /// Returns true if the invocation ran out of time.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Failure::Timeout(_))
    }
}

/// Outcome of a call made through a resilience primitive that did not succeed.
#[derive(Debug, Error)]
pub enum ResilienceError<E> {
    /// The circuit breaker rejected the call without invoking it.
    #[error("circuit breaker '{breaker}' is open")]
    CircuitOpen { breaker: String },
    /// The call was invoked once and failed.
    #[error("call failed: {0}")]
    Failed(#[source] Failure<E>),
    /// Every allowed attempt failed; carries the last attempt's cause.
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Failure<E>,
    },
}

impl<E> ResilienceError<E> {
    /// Returns true if the call was rejected by an open breaker.
    pub fn is_circuit_open(&self) -> bool {
        matches!(self, ResilienceError::CircuitOpen { .. })
    }

    /// Returns the most recent invocation failure, if the call was invoked at all.
    pub fn last_failure(&self) -> Option<&Failure<E>> {
        match self {
            ResilienceError::CircuitOpen { .. } => None,
            ResilienceError::Failed(failure) => Some(failure),
            ResilienceError::Exhausted { last, .. } => Some(last),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fmt;

    use super::*;

    #[derive(Debug)]
    struct Boom;

    impl fmt::Display for Boom {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "boom")
        }
    }

    impl std::error::Error for Boom {}

    #[test]
    fn test_display_messages() {
        let open: ResilienceError<Boom> = ResilienceError::CircuitOpen {
            breaker: "inventory".to_string(),
        };
        assert_eq!(open.to_string(), "circuit breaker 'inventory' is open");

        let exhausted: ResilienceError<Boom> = ResilienceError::Exhausted {
            attempts: 3,
            last: Failure::Timeout(Duration::from_secs(5)),
        };
        assert_eq!(
            exhausted.to_string(),
            "gave up after 3 attempts: timed out after 5000ms"
        );

        let failed = ResilienceError::Failed(Failure::Inner(Boom));
        assert_eq!(failed.to_string(), "call failed: boom");
    }

    #[test]
    fn test_exhausted_source_chain_reaches_inner_error() {
        use std::error::Error;

        let exhausted = ResilienceError::Exhausted {
            attempts: 3,
            last: Failure::Inner(Boom),
        };
        let last = exhausted.source().unwrap();
        assert_eq!(last.to_string(), "boom");
        assert_eq!(last.source().unwrap().to_string(), "boom");

        let timed_out: Failure<Boom> = Failure::Timeout(Duration::from_millis(250));
        assert!(timed_out.source().is_none());
    }

    #[test]
    fn test_last_failure_and_source() {
        use std::error::Error;

        let open: ResilienceError<Boom> = ResilienceError::CircuitOpen {
            breaker: "inventory".to_string(),
        };
        assert!(open.is_circuit_open());
        assert!(open.last_failure().is_none());
        assert!(open.source().is_none());

        let failed = ResilienceError::Failed(Failure::Inner(Boom));
        assert!(failed.last_failure().unwrap().inner().is_some());
        assert!(failed.source().is_some());
    }
}
