use async_trait::async_trait;
use common::{EventId, ReservationId, SeatId};
use domain::{NewReservation, ReservationRecord};

use crate::Result;

/// Core trait for reservation store implementations.
///
/// Implementations must be safe for concurrent writers: every successful
/// `insert` yields a distinct identifier, even under parallel load.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Durably stores a reservation and returns it with its assigned
    /// identifier and creation timestamp.
    ///
    /// The record is visible to `get` once this returns.
    async fn insert(&self, reservation: NewReservation) -> Result<ReservationRecord>;

    /// Retrieves a reservation by identifier.
    async fn get(&self, id: ReservationId) -> Result<Option<ReservationRecord>>;

    /// Retrieves all reservations for a seat, oldest first.
    async fn find_by_seat(
        &self,
        event_id: &EventId,
        seat_id: &SeatId,
    ) -> Result<Vec<ReservationRecord>>;

    /// Returns the total number of stored reservations.
    async fn count(&self) -> Result<u64>;
}
