//! Orchestrator error types.

use common::{EventId, SeatId};
use domain::DomainError;
use reservation_store::StoreError;
use thiserror::Error;

/// Error returned by a dependency service call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The service could not be reached or could not answer.
    #[error("{service} service unavailable: {reason}")]
    Unavailable {
        service: &'static str,
        reason: String,
    },
}

impl ServiceError {
    pub fn unavailable(service: &'static str, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            service,
            reason: reason.into(),
        }
    }
}

/// A downstream dependency the orchestrator must hear from before committing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dependency {
    Inventory,
    Payment,
}

impl Dependency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dependency::Inventory => "inventory",
            Dependency::Payment => "payment",
        }
    }
}

impl std::fmt::Display for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a failed reservation should be reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// A dependency could not give an answer; try again later.
    DependencyUnavailable,
    /// A dependency answered no.
    BusinessRejection,
    /// The request itself is malformed.
    InvalidRequest,
    /// The orchestrator failed after its dependencies agreed.
    Internal,
}

impl ErrorClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorClass::DependencyUnavailable => "dependency_unavailable",
            ErrorClass::BusinessRejection => "business_rejection",
            ErrorClass::InvalidRequest => "invalid_request",
            ErrorClass::Internal => "internal",
        }
    }
}

/// Why a reservation was not made.
///
/// In every case no reservation record exists for the request.
#[derive(Debug, Error)]
pub enum ReservationError {
    #[error("Invalid reservation request: {0}")]
    InvalidRequest(#[from] DomainError),

    /// The dependency could not confirm in time, or its breaker is open.
    #[error("{dependency} temporarily unavailable: {reason}")]
    DependencyUnavailable {
        dependency: Dependency,
        reason: String,
    },

    #[error("Seat {seat_id} is not available for event {event_id}")]
    SeatUnavailable { event_id: EventId, seat_id: SeatId },

    #[error("Payment declined (transaction {transaction_id})")]
    PaymentDeclined { transaction_id: String },

    #[error("Reservation could not be stored: {0}")]
    Storage(#[from] StoreError),
}

impl ReservationError {
    pub fn class(&self) -> ErrorClass {
        match self {
            ReservationError::InvalidRequest(_) => ErrorClass::InvalidRequest,
            ReservationError::DependencyUnavailable { .. } => ErrorClass::DependencyUnavailable,
            ReservationError::SeatUnavailable { .. } | ReservationError::PaymentDeclined { .. } => {
                ErrorClass::BusinessRejection
            }
            ReservationError::Storage(_) => ErrorClass::Internal,
        }
    }

    /// Machine-readable reason code.
    pub fn reason(&self) -> &'static str {
        match self {
            ReservationError::InvalidRequest(_) => "invalid_request",
            ReservationError::DependencyUnavailable {
                dependency: Dependency::Inventory,
                ..
            } => "inventory_unavailable",
            ReservationError::DependencyUnavailable {
                dependency: Dependency::Payment,
                ..
            } => "payment_unavailable",
            ReservationError::SeatUnavailable { .. } => "seat_unavailable",
            ReservationError::PaymentDeclined { .. } => "payment_declined",
            ReservationError::Storage(_) => "storage_failure",
        }
    }

    /// Whether submitting the same request later could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self.class(), ErrorClass::DependencyUnavailable | ErrorClass::Internal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let unavailable = ReservationError::DependencyUnavailable {
            dependency: Dependency::Inventory,
            reason: "circuit breaker 'inventory' is open".to_string(),
        };
        assert_eq!(unavailable.class(), ErrorClass::DependencyUnavailable);
        assert_eq!(unavailable.reason(), "inventory_unavailable");
        assert!(unavailable.is_retryable());

        let declined = ReservationError::PaymentDeclined {
            transaction_id: "TXN-1".to_string(),
        };
        assert_eq!(declined.class(), ErrorClass::BusinessRejection);
        assert!(!declined.is_retryable());

        let invalid = ReservationError::from(DomainError::EmptyField { field: "seatId" });
        assert_eq!(invalid.class(), ErrorClass::InvalidRequest);
        assert!(!invalid.is_retryable());
    }

    #[test]
    fn test_display() {
        let err = ReservationError::SeatUnavailable {
            event_id: EventId::new("concert-1"),
            seat_id: SeatId::new("A-1"),
        };
        assert_eq!(err.to_string(), "Seat A-1 is not available for event concert-1");

        let err = ReservationError::DependencyUnavailable {
            dependency: Dependency::Payment,
            reason: "gave up after 3 attempts".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "payment temporarily unavailable: gave up after 3 attempts"
        );
    }
}
