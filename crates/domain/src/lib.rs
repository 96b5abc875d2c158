//! Domain layer for the reservation system.
//!
//! This crate provides the value objects that flow through a reservation:
//! - `Money` for charge amounts
//! - `ReservationRequest` with its validation rules
//! - `ReservationRecord`, the durable outcome of a confirmed reservation

pub mod error;
pub mod money;
pub mod reservation;

pub use common::{EventId, ReservationId, SeatId};
pub use error::DomainError;
pub use money::Money;
pub use reservation::{NewReservation, ReservationRecord, ReservationRequest, ReservationStatus};
