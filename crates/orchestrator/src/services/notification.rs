//! Notification service trait and in-memory implementation.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use common::ReservationId;

use crate::error::ServiceError;

/// Acknowledgement that a notification was accepted for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationAck {
    pub recipient: String,
    pub reservation_id: ReservationId,
}

/// Trait for telling a customer about their reservation.
#[async_trait]
pub trait NotificationService: Send + Sync {
    /// Sends a confirmation for `reservation_id` to `user_email`.
    async fn send(
        &self,
        user_email: &str,
        reservation_id: ReservationId,
    ) -> Result<NotificationAck, ServiceError>;
}

#[derive(Debug, Default)]
struct InMemoryNotificationState {
    sent: Vec<NotificationAck>,
    disabled: bool,
    latency: Duration,
    calls: u64,
}

/// In-memory notifier that records what it sent.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotificationService {
    state: Arc<RwLock<InMemoryNotificationState>>,
}

impl InMemoryNotificationService {
    /// Creates a new in-memory notification service.
    pub fn new() -> Self {
        Self::default()
    }

    /// While disabled, every send fails.
    pub fn set_disabled(&self, disabled: bool) {
        self.write().disabled = disabled;
    }

    pub fn is_disabled(&self) -> bool {
        self.read().disabled
    }

    pub fn set_latency(&self, latency: Duration) {
        self.write().latency = latency;
    }

    /// Notifications delivered so far.
    pub fn sent(&self) -> Vec<NotificationAck> {
        self.read().sent.clone()
    }

    /// Number of send attempts received.
    pub fn call_count(&self) -> u64 {
        self.read().calls
    }

    fn read(&self) -> RwLockReadGuard<'_, InMemoryNotificationState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, InMemoryNotificationState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl NotificationService for InMemoryNotificationService {
    async fn send(
        &self,
        user_email: &str,
        reservation_id: ReservationId,
    ) -> Result<NotificationAck, ServiceError> {
        let latency = {
            let mut state = self.write();
            state.calls += 1;
            state.latency
        };

        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let mut state = self.write();
        if state.disabled {
            return Err(ServiceError::unavailable("notification", "service disabled"));
        }

        let ack = NotificationAck {
            recipient: user_email.to_string(),
            reservation_id,
        };
        state.sent.push(ack.clone());
        Ok(ack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_records_notification() {
        let service = InMemoryNotificationService::new();

        let ack = service
            .send("fan@example.com", ReservationId::new(7))
            .await
            .unwrap();

        assert_eq!(ack.recipient, "fan@example.com");
        assert_eq!(service.sent(), vec![ack]);
        assert_eq!(service.call_count(), 1);
    }

    #[tokio::test]
    async fn test_disabled_service_fails() {
        let service = InMemoryNotificationService::new();
        service.set_disabled(true);
        assert!(service.is_disabled());

        let result = service.send("fan@example.com", ReservationId::new(7)).await;
        assert!(result.is_err());
        assert!(service.sent().is_empty());

        service.set_disabled(false);
        assert!(service.send("fan@example.com", ReservationId::new(8)).await.is_ok());
        assert_eq!(service.call_count(), 2);
    }
}
