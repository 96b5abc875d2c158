//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::DomainError;
use orchestrator::{ErrorClass, ReservationError};

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Reservation was not made.
    Reservation(ReservationError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, class, reason, message, retryable) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", "not_found", msg, false),
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorClass::InvalidRequest.as_str(),
                "invalid_request",
                msg,
                false,
            ),
            ApiError::Reservation(err) => {
                let status = reservation_status(&err);
                if err.class() == ErrorClass::Internal {
                    tracing::error!(error = %err, "internal server error");
                }
                (
                    status,
                    err.class().as_str(),
                    err.reason(),
                    err.to_string(),
                    err.is_retryable(),
                )
            }
        };

        let body = serde_json::json!({
            "success": false,
            "error": class,
            "reason": reason,
            "message": message,
            "retryable": retryable,
        });
        (status, axum::Json(body)).into_response()
    }
}

fn reservation_status(err: &ReservationError) -> StatusCode {
    match err {
        ReservationError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        ReservationError::DependencyUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        ReservationError::SeatUnavailable { .. } => StatusCode::CONFLICT,
        ReservationError::PaymentDeclined { .. } => StatusCode::PAYMENT_REQUIRED,
        ReservationError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<ReservationError> for ApiError {
    fn from(err: ReservationError) -> Self {
        ApiError::Reservation(err)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Reservation(ReservationError::InvalidRequest(err))
    }
}
