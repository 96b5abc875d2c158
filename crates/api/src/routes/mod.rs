//! HTTP route handlers.

pub mod breakers;
pub mod chaos;
pub mod health;
pub mod metrics;
pub mod reservations;
