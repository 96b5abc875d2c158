//! Domain error types.

use thiserror::Error;

/// Errors raised while building or validating domain values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A required identifier was empty.
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },

    /// The contact address is not usable for notifications.
    #[error("Invalid contact address: {0}")]
    InvalidEmail(String),

    /// The amount is zero, negative or not a finite number.
    #[error("Amount must be a positive decimal, got {0}")]
    InvalidAmount(String),

    /// The amount carries precision finer than one cent.
    #[error("Amount must be a whole number of cents, got {0}")]
    SubCentAmount(String),

    /// A persisted status string did not match any known status.
    #[error("Unknown reservation status: {0}")]
    UnknownStatus(String),
}

/// Convenience type alias for domain results.
pub type Result<T> = std::result::Result<T, DomainError>;
