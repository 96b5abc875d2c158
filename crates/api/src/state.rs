//! Shared application state.

use orchestrator::{
    InMemoryInventoryService, InMemoryNotificationService, InMemoryPaymentService,
    ReservationOrchestrator,
};
use reservation_store::ReservationStore;

/// Orchestrator wired to the in-process dependency simulators.
pub type Orchestrator<S> = ReservationOrchestrator<
    S,
    InMemoryInventoryService,
    InMemoryPaymentService,
    InMemoryNotificationService,
>;

/// Shared application state accessible from all handlers.
///
/// The simulator handles share state with the ones held by the
/// orchestrator, so chaos toggles take effect on the next request.
pub struct AppState<S: ReservationStore> {
    pub orchestrator: Orchestrator<S>,
    pub inventory: InMemoryInventoryService,
    pub payment: InMemoryPaymentService,
    pub notification: InMemoryNotificationService,
}
