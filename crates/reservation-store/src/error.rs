use domain::DomainError;
use thiserror::Error;

/// Errors that can occur when interacting with the reservation store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored row could not be mapped back to a record.
    #[error("Corrupt reservation row: {0}")]
    Corrupt(#[from] DomainError),
}

/// Result type for reservation store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
