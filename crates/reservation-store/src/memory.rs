use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{EventId, ReservationId, SeatId};
use domain::{NewReservation, ReservationRecord};
use tokio::sync::RwLock;

use crate::{Result, store::ReservationStore};

#[derive(Debug, Default)]
struct Table {
    rows: Vec<ReservationRecord>,
    last_id: i64,
}

/// In-memory reservation store implementation for testing.
///
/// Identifiers are assigned from a counter under the same write lock that
/// appends the row, so concurrent inserts never share an identifier.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReservationStore {
    table: Arc<RwLock<Table>>,
}

impl InMemoryReservationStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of every stored record, in insertion order.
    pub async fn all(&self) -> Vec<ReservationRecord> {
        self.table.read().await.rows.clone()
    }
}

#[async_trait]
impl ReservationStore for InMemoryReservationStore {
    async fn insert(&self, reservation: NewReservation) -> Result<ReservationRecord> {
        let mut table = self.table.write().await;
        table.last_id += 1;
        let record = reservation.into_record(ReservationId::new(table.last_id), Utc::now());
        table.rows.push(record.clone());

        metrics::counter!("reservations_persisted_total").increment(1);
        tracing::debug!(reservation_id = %record.id, "reservation stored in memory");
        Ok(record)
    }

    async fn get(&self, id: ReservationId) -> Result<Option<ReservationRecord>> {
        let table = self.table.read().await;
        Ok(table.rows.iter().find(|r| r.id == id).cloned())
    }

    async fn find_by_seat(
        &self,
        event_id: &EventId,
        seat_id: &SeatId,
    ) -> Result<Vec<ReservationRecord>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .iter()
            .filter(|r| &r.event_id == event_id && &r.seat_id == seat_id)
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.table.read().await.rows.len() as u64)
    }
}
