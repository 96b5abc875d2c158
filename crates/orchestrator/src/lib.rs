//! Reservation orchestration.
//!
//! A reservation is committed only if two independent dependencies agree:
//! 1. Inventory confirms the seat is available (behind a circuit breaker)
//! 2. Payment approves the charge (behind bounded retry with timeouts)
//!
//! The confirmed reservation is then stored, and a notification is sent
//! best-effort on its own task. Nothing is rolled back: a failure after
//! payment leaves the charge in place.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod services;

pub use config::OrchestratorConfig;
pub use error::{Dependency, ErrorClass, ReservationError, ServiceError};
pub use orchestrator::{ReservationConfirmation, ReservationOrchestrator};
pub use services::{
    Fault, InMemoryInventoryService, InMemoryNotificationService, InMemoryPaymentService,
    InventoryService, NotificationAck, NotificationService, PaymentReceipt, PaymentService,
};
