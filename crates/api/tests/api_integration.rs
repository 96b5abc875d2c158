//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use api::AppState;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{EventId, SeatId};
use metrics_exporter_prometheus::PrometheusHandle;
use orchestrator::OrchestratorConfig;
use reservation_store::{InMemoryReservationStore, ReservationStore};
use resilience::{CircuitBreakerConfig, DispatchConfig, RetryConfig};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

/// Short timings so failure paths finish quickly on the real clock.
fn fast_config() -> OrchestratorConfig {
    OrchestratorConfig {
        inventory_breaker: CircuitBreakerConfig {
            failure_threshold: 3,
            recovery_timeout: Duration::from_secs(60),
            call_timeout: Some(Duration::from_millis(200)),
        },
        payment_retry: RetryConfig {
            max_attempts: 3,
            delay: Duration::from_millis(10),
            attempt_timeout: Some(Duration::from_millis(50)),
        },
        notification: DispatchConfig {
            timeout: Some(Duration::from_millis(200)),
        },
    }
}

fn setup() -> (axum::Router, Arc<AppState<InMemoryReservationStore>>) {
    let state = api::create_default_state(InMemoryReservationStore::new(), fast_config());
    let app = api::create_app(state.clone(), get_metrics_handle());
    (app, state)
}

fn reservation_body(seat: &str) -> Body {
    Body::from(
        serde_json::json!({
            "eventId": "concert-1",
            "seatId": seat,
            "userEmail": "fan@example.com",
            "amount": 50.0
        })
        .to_string(),
    )
}

fn post_reservation(seat: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/reservations")
        .header("content-type", "application/json")
        .body(reservation_body(seat))
        .unwrap()
}

fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = setup();

    for uri in ["/health", "/api/reservations/health"] {
        let (status, json) = send(&app, get(uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
    }
}

#[tokio::test]
async fn test_create_and_get_reservation() {
    let (app, state) = setup();

    let (status, json) = send(&app, post_reservation("A-1")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["success"], true);
    assert_eq!(json["reservationId"], 1);
    assert_eq!(json["message"], "Reservation confirmed");

    let (status, json) = send(&app, get("/api/reservations/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], 1);
    assert_eq!(json["eventId"], "concert-1");
    assert_eq!(json["seatId"], "A-1");
    assert_eq!(json["userEmail"], "fan@example.com");
    assert_eq!(json["status"], "CONFIRMED");

    assert_eq!(state.orchestrator.store().count().await.unwrap(), 1);
    assert_eq!(state.payment.charges().len(), 1);
}

#[tokio::test]
async fn test_get_nonexistent_reservation() {
    let (app, _) = setup();

    let (status, json) = send(&app, get("/api/reservations/999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "not_found");
}

#[tokio::test]
async fn test_invalid_request_is_bad_request() {
    let (app, state) = setup();

    let request = Request::builder()
        .method("POST")
        .uri("/api/reservations")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::json!({
                "eventId": "concert-1",
                "seatId": "A-1",
                "userEmail": "not-an-address",
                "amount": 50.0
            })
            .to_string(),
        ))
        .unwrap();

    let (status, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "invalid_request");
    assert_eq!(json["retryable"], false);
    assert_eq!(state.inventory.call_count(), 0);
}

#[tokio::test]
async fn test_non_positive_amount_is_bad_request() {
    let (app, _) = setup();

    let request = Request::builder()
        .method("POST")
        .uri("/api/reservations")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::json!({
                "eventId": "concert-1",
                "seatId": "A-1",
                "userEmail": "fan@example.com",
                "amount": 0.0
            })
            .to_string(),
        ))
        .unwrap();

    let (status, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
}

fn post_raw_reservation(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/reservations")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_missing_field_is_structured_bad_request() {
    let (app, state) = setup();

    let (status, json) = send(
        &app,
        post_raw_reservation(
            r#"{"eventId":"concert-1","seatId":"A-1","userEmail":"fan@example.com"}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "invalid_request");
    assert_eq!(json["reason"], "invalid_request");
    assert_eq!(json["retryable"], false);
    assert!(json["message"].as_str().unwrap().contains("amount"));
    assert_eq!(state.inventory.call_count(), 0);
}

#[tokio::test]
async fn test_malformed_json_is_structured_bad_request() {
    let (app, _) = setup();

    let (status, json) = send(&app, post_raw_reservation(r#"{"eventId": "concert-1","#)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "invalid_request");
    assert!(json["message"].is_string());
}

#[tokio::test]
async fn test_sub_cent_amount_is_bad_request() {
    let (app, state) = setup();

    let (status, json) = send(
        &app,
        post_raw_reservation(
            r#"{"eventId":"concert-1","seatId":"A-1","userEmail":"fan@example.com","amount":0.004}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json["message"],
        "Invalid reservation request: Amount must be a whole number of cents, got 0.004"
    );
    assert_eq!(state.inventory.call_count(), 0);
}

#[tokio::test]
async fn test_taken_seat_is_conflict() {
    let (app, state) = setup();
    state
        .inventory
        .mark_taken(EventId::new("concert-1"), SeatId::new("A-1"));

    let (status, json) = send(&app, post_reservation("A-1")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "business_rejection");
    assert_eq!(json["reason"], "seat_unavailable");
    assert_eq!(json["retryable"], false);
    assert_eq!(state.payment.call_count(), 0);
}

#[tokio::test]
async fn test_declined_payment_is_payment_required() {
    let (app, state) = setup();
    state.payment.set_declining(true);

    let (status, json) = send(&app, post_reservation("A-1")).await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(json["reason"], "payment_declined");
    assert_eq!(state.orchestrator.store().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_inventory_crash_opens_breaker() {
    let (app, state) = setup();

    let (status, json) = send(&app, post("/api/inventory/chaos/crash")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["message"].is_string());

    let (_, json) = send(&app, get("/api/inventory/chaos/status")).await;
    assert_eq!(json["crashed"], true);

    for seat in ["A-1", "A-2", "A-3", "A-4"] {
        let (status, json) = send(&app, post_reservation(seat)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["error"], "dependency_unavailable");
        assert_eq!(json["reason"], "inventory_unavailable");
        assert_eq!(json["retryable"], true);
    }
    assert_eq!(state.inventory.call_count(), 3);

    let (status, json) = send(&app, get("/api/breakers/inventory")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "inventory");
    assert_eq!(json["state"], "open");
    assert_eq!(json["failureThreshold"], 3);

    let (_, json) = send(&app, post("/api/inventory/chaos/recover")).await;
    assert!(json["message"].is_string());
    assert!(!state.inventory.is_crashed());
}

#[tokio::test]
async fn test_slow_payment_exhausts_retries() {
    let (app, state) = setup();

    let (status, _) = send(&app, post("/api/payments/chaos/slow?delay=1")).await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = send(&app, get("/api/payments/chaos/status")).await;
    assert_eq!(json["latencySeconds"], 1.0);

    let (status, json) = send(&app, post_reservation("A-1")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["reason"], "payment_unavailable");
    assert_eq!(state.payment.call_count(), 3);
    assert_eq!(state.orchestrator.store().count().await.unwrap(), 0);

    send(&app, post("/api/payments/chaos/normal")).await;
    let (_, json) = send(&app, get("/api/payments/chaos/status")).await;
    assert_eq!(json["latencySeconds"], 0.0);
}

#[tokio::test]
async fn test_slow_defaults_to_twenty_seconds() {
    let (app, state) = setup();

    send(&app, post("/api/payments/chaos/slow")).await;

    assert_eq!(state.payment.latency(), Duration::from_secs(20));
}

#[tokio::test]
async fn test_disabled_notifications_do_not_fail_reservation() {
    let (app, state) = setup();

    send(&app, post("/api/notifications/chaos/disable")).await;
    let (_, json) = send(&app, get("/api/notifications/chaos/status")).await;
    assert_eq!(json["disabled"], true);

    let (status, json) = send(&app, post_reservation("A-1")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["success"], true);

    for _ in 0..500 {
        if state.orchestrator.notifier().stats().settled() >= 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    assert_eq!(state.orchestrator.notifier().stats().failed, 1);
    assert!(state.notification.sent().is_empty());

    send(&app, post("/api/notifications/chaos/enable")).await;
    assert!(!state.notification.is_disabled());
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, _) = setup();

    send(&app, post_reservation("M-1")).await;

    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("reservations_total"));
}
