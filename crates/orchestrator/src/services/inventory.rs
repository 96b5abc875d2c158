//! Inventory service trait and in-memory implementation.

use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use common::{EventId, SeatId};

use crate::error::ServiceError;

/// Trait for seat availability lookups.
#[async_trait]
pub trait InventoryService: Send + Sync {
    /// Returns whether the seat can still be reserved for the event.
    ///
    /// A read-only check: calling it any number of times changes nothing.
    async fn check_availability(
        &self,
        event_id: &EventId,
        seat_id: &SeatId,
    ) -> Result<bool, ServiceError>;
}

#[derive(Debug, Default)]
struct InMemoryInventoryState {
    taken: HashSet<(EventId, SeatId)>,
    crashed: bool,
    latency: Duration,
    calls: u64,
}

/// In-memory inventory with a crash switch for chaos testing.
///
/// Every seat is available unless marked taken.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInventoryService {
    state: Arc<RwLock<InMemoryInventoryState>>,
}

impl InMemoryInventoryService {
    /// Creates a new in-memory inventory service.
    pub fn new() -> Self {
        Self::default()
    }

    /// While crashed, every check fails as if the service were down.
    pub fn set_crashed(&self, crashed: bool) {
        self.write().crashed = crashed;
    }

    pub fn is_crashed(&self) -> bool {
        self.read().crashed
    }

    /// Adds a fixed delay before each check answers.
    pub fn set_latency(&self, latency: Duration) {
        self.write().latency = latency;
    }

    /// Marks a seat as no longer available.
    pub fn mark_taken(&self, event_id: EventId, seat_id: SeatId) {
        self.write().taken.insert((event_id, seat_id));
    }

    /// Number of checks received, including failed ones.
    pub fn call_count(&self) -> u64 {
        self.read().calls
    }

    fn read(&self) -> RwLockReadGuard<'_, InMemoryInventoryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, InMemoryInventoryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl InventoryService for InMemoryInventoryService {
    async fn check_availability(
        &self,
        event_id: &EventId,
        seat_id: &SeatId,
    ) -> Result<bool, ServiceError> {
        let latency = {
            let mut state = self.write();
            state.calls += 1;
            state.latency
        };

        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let state = self.read();
        if state.crashed {
            return Err(ServiceError::unavailable("inventory", "service crashed"));
        }

        Ok(!state.taken.contains(&(event_id.clone(), seat_id.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seat() -> (EventId, SeatId) {
        (EventId::new("concert-1"), SeatId::new("A-1"))
    }

    #[tokio::test]
    async fn test_seat_available_by_default() {
        let service = InMemoryInventoryService::new();
        let (event, seat) = seat();

        assert!(service.check_availability(&event, &seat).await.unwrap());
        assert_eq!(service.call_count(), 1);
    }

    #[tokio::test]
    async fn test_taken_seat_is_unavailable() {
        let service = InMemoryInventoryService::new();
        let (event, seat) = seat();
        service.mark_taken(event.clone(), seat.clone());

        assert!(!service.check_availability(&event, &seat).await.unwrap());
        assert!(
            service
                .check_availability(&event, &SeatId::new("A-2"))
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_crashed_service_fails_until_recovered() {
        let service = InMemoryInventoryService::new();
        let (event, seat) = seat();

        service.set_crashed(true);
        assert!(service.is_crashed());
        let err = service.check_availability(&event, &seat).await.unwrap_err();
        assert!(err.to_string().contains("inventory"));

        service.set_crashed(false);
        assert!(service.check_availability(&event, &seat).await.unwrap());
        assert_eq!(service.call_count(), 2);
    }

    #[tokio::test]
    async fn test_repeated_checks_do_not_change_availability() {
        let service = InMemoryInventoryService::new();
        let (event, seat) = seat();

        for _ in 0..3 {
            assert!(service.check_availability(&event, &seat).await.unwrap());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_delays_answer() {
        let service = InMemoryInventoryService::new();
        service.set_latency(Duration::from_secs(2));
        let (event, seat) = seat();

        let start = tokio::time::Instant::now();
        service.check_availability(&event, &seat).await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }
}
