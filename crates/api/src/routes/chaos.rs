//! Fault injection endpoints for the dependency simulators.

use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::extract::{Query, State};
use reservation_store::ReservationStore;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

const DEFAULT_SLOW_DELAY_SECS: u64 = 20;

#[derive(Debug, Serialize)]
pub struct ChaosResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct InventoryStatus {
    pub crashed: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatus {
    pub latency_seconds: f64,
}

#[derive(Debug, Serialize)]
pub struct NotificationStatus {
    pub disabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct SlowParams {
    pub delay: Option<u64>,
}

fn message(text: impl Into<String>) -> Json<ChaosResponse> {
    Json(ChaosResponse {
        message: text.into(),
    })
}

/// POST /api/inventory/chaos/crash
pub async fn inventory_crash<S: ReservationStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<ChaosResponse> {
    state.inventory.set_crashed(true);
    tracing::warn!("chaos: inventory crashed");
    message("Inventory is now DOWN")
}

/// POST /api/inventory/chaos/recover
pub async fn inventory_recover<S: ReservationStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<ChaosResponse> {
    state.inventory.set_crashed(false);
    tracing::info!("chaos: inventory recovered");
    message("Inventory recovered")
}

/// GET /api/inventory/chaos/status
pub async fn inventory_status<S: ReservationStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<InventoryStatus> {
    Json(InventoryStatus {
        crashed: state.inventory.is_crashed(),
    })
}

/// POST /api/payments/chaos/slow?delay=<secs>
pub async fn payments_slow<S: ReservationStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<SlowParams>,
) -> Json<ChaosResponse> {
    let delay = params.delay.unwrap_or(DEFAULT_SLOW_DELAY_SECS);
    state.payment.set_latency(Duration::from_secs(delay));
    tracing::warn!(delay_secs = delay, "chaos: payment latency injected");
    message(format!("Payments now respond after {delay}s"))
}

/// POST /api/payments/chaos/normal
pub async fn payments_normal<S: ReservationStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<ChaosResponse> {
    state.payment.set_latency(Duration::ZERO);
    tracing::info!("chaos: payment latency cleared");
    message("Payments operating normally")
}

/// GET /api/payments/chaos/status
pub async fn payments_status<S: ReservationStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<PaymentStatus> {
    Json(PaymentStatus {
        latency_seconds: state.payment.latency().as_secs_f64(),
    })
}

/// POST /api/notifications/chaos/disable
pub async fn notifications_disable<S: ReservationStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<ChaosResponse> {
    state.notification.set_disabled(true);
    tracing::warn!("chaos: notifications disabled");
    message("Notifications DISABLED")
}

/// POST /api/notifications/chaos/enable
pub async fn notifications_enable<S: ReservationStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<ChaosResponse> {
    state.notification.set_disabled(false);
    tracing::info!("chaos: notifications enabled");
    message("Notifications enabled")
}

/// GET /api/notifications/chaos/status
pub async fn notifications_status<S: ReservationStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<NotificationStatus> {
    Json(NotificationStatus {
        disabled: state.notification.is_disabled(),
    })
}
