//! PostgreSQL integration tests
//!
//! These tests start a PostgreSQL container and need a running Docker daemon.
//! Run with:
//!
//! ```bash
//! cargo test -p reservation-store --test postgres_integration -- --ignored --test-threads=1
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use domain::{Money, NewReservation, ReservationRequest, ReservationStatus};
use reservation_store::{PostgresReservationStore, ReservationId, ReservationStore};
use common::{EventId, SeatId};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let store = PostgresReservationStore::connect(&connection_string)
                .await
                .unwrap();
            store.run_migrations().await.unwrap();
            store.pool().close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

async fn setup() -> PostgresReservationStore {
    let info = get_container_info().await;
    let store = PostgresReservationStore::connect(&info.connection_string)
        .await
        .unwrap();
    sqlx::query("TRUNCATE reservations RESTART IDENTITY")
        .execute(store.pool())
        .await
        .unwrap();
    store
}

fn new_reservation(seat: &str) -> NewReservation {
    NewReservation::confirmed(&ReservationRequest::new(
        "concert-1",
        seat,
        "fan@example.com",
        Money::from_cents(5000),
    ))
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_insert_and_get() {
    let store = setup().await;

    let record = store.insert(new_reservation("A-1")).await.unwrap();
    assert_eq!(record.id, ReservationId::new(1));
    assert_eq!(record.status, ReservationStatus::Confirmed);

    let loaded = store.get(record.id).await.unwrap().unwrap();
    assert_eq!(loaded.id, record.id);
    assert_eq!(loaded.seat_id.as_str(), "A-1");
    assert_eq!(loaded.user_email, "fan@example.com");
    assert_eq!(loaded.status, ReservationStatus::Confirmed);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_get_missing_returns_none() {
    let store = setup().await;
    assert!(store.get(ReservationId::new(404)).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_find_by_seat() {
    let store = setup().await;
    store.insert(new_reservation("A-1")).await.unwrap();
    store.insert(new_reservation("B-2")).await.unwrap();

    let found = store
        .find_by_seat(&EventId::new("concert-1"), &SeatId::new("B-2"))
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].seat_id.as_str(), "B-2");
    assert_eq!(store.count().await.unwrap(), 2);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_concurrent_inserts_get_unique_ids() {
    let store = setup().await;
    let mut handles = Vec::new();

    for i in 0..20 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .insert(new_reservation(&format!("C-{i}")))
                .await
                .unwrap()
                .id
        }));
    }

    let mut ids = HashSet::new();
    for handle in handles {
        assert!(ids.insert(handle.await.unwrap()));
    }
    assert_eq!(store.count().await.unwrap(), 20);
}
