//! Reservation submission and lookup endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::ReservationId;
use domain::{Money, ReservationRecord, ReservationRequest};
use reservation_store::ReservationStore;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

// -- Request types --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    pub event_id: String,
    pub seat_id: String,
    pub user_email: String,
    pub amount: f64,
}

// -- Response types --

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationCreatedResponse {
    pub success: bool,
    pub reservation_id: i64,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationResponse {
    pub id: i64,
    pub event_id: String,
    pub seat_id: String,
    pub user_email: String,
    pub status: String,
    pub created_at: String,
}

impl From<ReservationRecord> for ReservationResponse {
    fn from(record: ReservationRecord) -> Self {
        Self {
            id: record.id.as_i64(),
            event_id: record.event_id.to_string(),
            seat_id: record.seat_id.to_string(),
            user_email: record.user_email,
            status: record.status.as_str().to_string(),
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

// -- Handlers --

/// POST /api/reservations — submit a reservation.
///
/// A body that is not valid JSON or misses a field is a 400 like any other
/// invalid request.
#[tracing::instrument(skip(state, payload))]
pub async fn create<S: ReservationStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<CreateReservationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ReservationCreatedResponse>), ApiError> {
    let Json(req) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let amount = Money::from_decimal(req.amount)?;
    let request = ReservationRequest::new(req.event_id, req.seat_id, req.user_email, amount);

    let confirmation = state.orchestrator.submit(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(ReservationCreatedResponse {
            success: true,
            reservation_id: confirmation.reservation_id.as_i64(),
            message: confirmation.message,
        }),
    ))
}

/// GET /api/reservations/{id} — fetch a stored reservation.
#[tracing::instrument(skip(state))]
pub async fn get<S: ReservationStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
) -> Result<Json<ReservationResponse>, ApiError> {
    let id = ReservationId::new(id);
    let record = state
        .orchestrator
        .get_reservation(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Reservation not found: {id}")))?;

    Ok(Json(record.into()))
}
