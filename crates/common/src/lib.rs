//! Shared identifier types for the reservation system.

pub mod types;

pub use types::{EventId, ReservationId, SeatId};
