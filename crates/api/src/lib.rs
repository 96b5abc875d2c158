//! HTTP API server for the reservation orchestrator.
//!
//! Provides the reservation endpoint, chaos toggles for the simulated
//! dependencies, breaker introspection, structured logging (tracing) and
//! Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use orchestrator::{
    InMemoryInventoryService, InMemoryNotificationService, InMemoryPaymentService,
    OrchestratorConfig, ReservationOrchestrator,
};
use reservation_store::ReservationStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: ReservationStore + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/api/reservations/health", get(routes::health::check))
        .route("/api/reservations", post(routes::reservations::create::<S>))
        .route("/api/reservations/{id}", get(routes::reservations::get::<S>))
        .route("/api/breakers/inventory", get(routes::breakers::inventory::<S>))
        .route(
            "/api/inventory/chaos/crash",
            post(routes::chaos::inventory_crash::<S>),
        )
        .route(
            "/api/inventory/chaos/recover",
            post(routes::chaos::inventory_recover::<S>),
        )
        .route(
            "/api/inventory/chaos/status",
            get(routes::chaos::inventory_status::<S>),
        )
        .route(
            "/api/payments/chaos/slow",
            post(routes::chaos::payments_slow::<S>),
        )
        .route(
            "/api/payments/chaos/normal",
            post(routes::chaos::payments_normal::<S>),
        )
        .route(
            "/api/payments/chaos/status",
            get(routes::chaos::payments_status::<S>),
        )
        .route(
            "/api/notifications/chaos/disable",
            post(routes::chaos::notifications_disable::<S>),
        )
        .route(
            "/api/notifications/chaos/enable",
            post(routes::chaos::notifications_enable::<S>),
        )
        .route(
            "/api/notifications/chaos/status",
            get(routes::chaos::notifications_status::<S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates application state around `store` with in-process dependency simulators.
pub fn create_default_state<S: ReservationStore + 'static>(
    store: S,
    config: OrchestratorConfig,
) -> Arc<AppState<S>> {
    let inventory = InMemoryInventoryService::new();
    let payment = InMemoryPaymentService::new();
    let notification = InMemoryNotificationService::new();

    let orchestrator = ReservationOrchestrator::new(
        store,
        inventory.clone(),
        payment.clone(),
        notification.clone(),
        config,
    );

    Arc::new(AppState {
        orchestrator,
        inventory,
        payment,
        notification,
    })
}
