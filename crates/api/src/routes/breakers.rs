//! Circuit breaker introspection.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use reservation_store::ReservationStore;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakerResponse {
    pub name: String,
    pub state: &'static str,
    pub failure_count: u32,
    pub failure_threshold: u32,
    pub recovery_timeout_secs: u64,
}

/// GET /api/breakers/inventory
pub async fn inventory<S: ReservationStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<BreakerResponse> {
    let breaker = state.orchestrator.inventory_breaker();
    Json(BreakerResponse {
        name: breaker.name().to_string(),
        state: breaker.state().as_str(),
        failure_count: breaker.failure_count(),
        failure_threshold: breaker.config().failure_threshold,
        recovery_timeout_secs: breaker.config().recovery_timeout.as_secs(),
    })
}
