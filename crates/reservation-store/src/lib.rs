//! Durable storage for confirmed reservations.
//!
//! The store is append-only: records are inserted once, with an identifier
//! assigned by the store, and never updated or deleted.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use common::ReservationId;
pub use error::{Result, StoreError};
pub use memory::InMemoryReservationStore;
pub use postgres::PostgresReservationStore;
pub use store::ReservationStore;
