//! Reservation orchestrator: inventory, then payment, then persist, then notify.

use std::time::Instant;

use common::ReservationId;
use domain::{NewReservation, ReservationRecord, ReservationRequest};
use reservation_store::ReservationStore;
use resilience::{CircuitBreaker, FireAndForget, RetryExecutor};

use crate::config::OrchestratorConfig;
use crate::error::{Dependency, ReservationError};
use crate::services::inventory::InventoryService;
use crate::services::notification::NotificationService;
use crate::services::payment::{PaymentReceipt, PaymentService};

/// Message returned with every confirmed reservation.
pub const CONFIRMATION_MESSAGE: &str = "Reservation confirmed";

/// Successful outcome of [`ReservationOrchestrator::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationConfirmation {
    pub reservation_id: ReservationId,
    pub transaction_id: String,
    pub message: String,
}

/// Drives one reservation request through its dependencies.
///
/// Inventory is called through a circuit breaker shared by every request,
/// payment through a bounded retry executor. A record is stored only once
/// both have agreed, and the notification is dispatched only after the
/// record exists. Notification outcome never reaches the caller.
pub struct ReservationOrchestrator<S, I, P, N>
where
    S: ReservationStore,
    I: InventoryService,
    P: PaymentService,
    N: NotificationService,
{
    store: S,
    inventory: I,
    payment: P,
    notification: N,
    inventory_breaker: CircuitBreaker,
    payment_retry: RetryExecutor,
    notifier: FireAndForget,
}

impl<S, I, P, N> ReservationOrchestrator<S, I, P, N>
where
    S: ReservationStore,
    I: InventoryService,
    P: PaymentService,
    N: NotificationService + Clone + 'static,
{
    /// Creates a new orchestrator.
    pub fn new(store: S, inventory: I, payment: P, notification: N, config: OrchestratorConfig) -> Self {
        Self {
            store,
            inventory,
            payment,
            notification,
            inventory_breaker: CircuitBreaker::new("inventory", config.inventory_breaker),
            payment_retry: RetryExecutor::new("payment", config.payment_retry),
            notifier: FireAndForget::new("notification", config.notification),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The breaker guarding inventory checks.
    pub fn inventory_breaker(&self) -> &CircuitBreaker {
        &self.inventory_breaker
    }

    pub fn payment_retry(&self) -> &RetryExecutor {
        &self.payment_retry
    }

    /// The dispatcher carrying notifications.
    pub fn notifier(&self) -> &FireAndForget {
        &self.notifier
    }

    /// Submits a reservation request.
    ///
    /// Returns once the outcome is decided. On success the record has been
    /// stored and its notification scheduled; on any error no record exists.
    #[tracing::instrument(
        skip(self, request),
        fields(event_id = %request.event_id, seat_id = %request.seat_id)
    )]
    pub async fn submit(
        &self,
        request: ReservationRequest,
    ) -> Result<ReservationConfirmation, ReservationError> {
        let start = Instant::now();
        metrics::counter!("reservations_submitted_total").increment(1);

        let result = self.process(&request).await;

        metrics::histogram!("reservation_duration_seconds").record(start.elapsed().as_secs_f64());
        match &result {
            Ok(confirmation) => {
                metrics::counter!("reservations_total", "outcome" => "confirmed").increment(1);
                tracing::info!(
                    reservation_id = %confirmation.reservation_id,
                    transaction_id = %confirmation.transaction_id,
                    "reservation confirmed"
                );
            }
            Err(err) => {
                metrics::counter!("reservations_total", "outcome" => err.reason()).increment(1);
                tracing::warn!(class = err.class().as_str(), error = %err, "reservation rejected");
            }
        }

        result
    }

    /// Looks up a stored reservation.
    pub async fn get_reservation(
        &self,
        id: ReservationId,
    ) -> Result<Option<ReservationRecord>, ReservationError> {
        Ok(self.store.get(id).await?)
    }

    async fn process(
        &self,
        request: &ReservationRequest,
    ) -> Result<ReservationConfirmation, ReservationError> {
        request.validate()?;

        tracing::info!(step = "inventory", "checking seat availability");
        self.check_inventory(request).await?;

        tracing::info!(step = "payment", amount = %request.amount, "charging customer");
        let receipt = self.charge(request).await?;

        tracing::info!(step = "persist", "storing reservation");
        let record = self
            .store
            .insert(NewReservation::confirmed(request))
            .await
            .inspect_err(|err| {
                tracing::error!(
                    transaction_id = %receipt.transaction_id,
                    error = %err,
                    "payment taken but reservation could not be stored"
                );
            })?;

        self.notify(&record);

        Ok(ReservationConfirmation {
            reservation_id: record.id,
            transaction_id: receipt.transaction_id,
            message: CONFIRMATION_MESSAGE.to_string(),
        })
    }

    /// Fails closed: an unknown answer is treated like an unavailable seat.
    async fn check_inventory(&self, request: &ReservationRequest) -> Result<(), ReservationError> {
        let inventory = &self.inventory;
        let event_id = &request.event_id;
        let seat_id = &request.seat_id;

        match self
            .inventory_breaker
            .call(move || inventory.check_availability(event_id, seat_id))
            .await
        {
            Ok(true) => Ok(()),
            Ok(false) => Err(ReservationError::SeatUnavailable {
                event_id: event_id.clone(),
                seat_id: seat_id.clone(),
            }),
            Err(err) => Err(ReservationError::DependencyUnavailable {
                dependency: Dependency::Inventory,
                reason: err.to_string(),
            }),
        }
    }

    async fn charge(&self, request: &ReservationRequest) -> Result<PaymentReceipt, ReservationError> {
        let payment = &self.payment;
        let amount = request.amount;
        let user_email = request.user_email.as_str();

        let receipt = self
            .payment_retry
            .call(move || payment.charge(amount, user_email))
            .await
            .map_err(|err| ReservationError::DependencyUnavailable {
                dependency: Dependency::Payment,
                reason: err.to_string(),
            })?;

        if !receipt.approved {
            return Err(ReservationError::PaymentDeclined {
                transaction_id: receipt.transaction_id,
            });
        }

        Ok(receipt)
    }

    fn notify(&self, record: &ReservationRecord) {
        let notification = self.notification.clone();
        let user_email = record.user_email.clone();
        let reservation_id = record.id;

        tracing::info!(step = "notify", %reservation_id, "scheduling notification");
        self.notifier.dispatch(async move {
            notification
                .send(&user_email, reservation_id)
                .await
                .map(|_| ())
        });
    }
}
