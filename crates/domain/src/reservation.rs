//! Reservation requests and the records they produce.

use chrono::{DateTime, Utc};
use common::{EventId, ReservationId, SeatId};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, Result};
use crate::money::Money;

/// A request to reserve one seat for one event and pay for it.
///
/// Lives only for the duration of a single orchestration call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationRequest {
    pub event_id: EventId,
    pub seat_id: SeatId,
    pub user_email: String,
    pub amount: Money,
}

impl ReservationRequest {
    /// Creates a new reservation request.
    pub fn new(
        event_id: impl Into<EventId>,
        seat_id: impl Into<SeatId>,
        user_email: impl Into<String>,
        amount: Money,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            seat_id: seat_id.into(),
            user_email: user_email.into(),
            amount,
        }
    }

    /// Checks the request before any dependency is contacted.
    pub fn validate(&self) -> Result<()> {
        if self.event_id.as_str().trim().is_empty() {
            return Err(DomainError::EmptyField { field: "eventId" });
        }
        if self.seat_id.as_str().trim().is_empty() {
            return Err(DomainError::EmptyField { field: "seatId" });
        }
        let email = self.user_email.trim();
        if email.is_empty() {
            return Err(DomainError::EmptyField { field: "userEmail" });
        }
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
            _ => return Err(DomainError::InvalidEmail(self.user_email.clone())),
        }
        if !self.amount.is_positive() {
            return Err(DomainError::InvalidAmount(self.amount.to_string()));
        }
        Ok(())
    }
}

/// Status of a persisted reservation.
///
/// Only confirmed reservations are ever written; failed attempts leave no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    #[default]
    Confirmed,
}

impl ReservationStatus {
    /// Returns the status as stored and displayed.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Confirmed => "CONFIRMED",
        }
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ReservationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "CONFIRMED" => Ok(ReservationStatus::Confirmed),
            other => Err(DomainError::UnknownStatus(other.to_string())),
        }
    }
}

/// The fields of a reservation before the store assigns its identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReservation {
    pub event_id: EventId,
    pub seat_id: SeatId,
    pub user_email: String,
    pub status: ReservationStatus,
}

impl NewReservation {
    /// Builds the confirmed reservation for a request whose checks all passed.
    pub fn confirmed(request: &ReservationRequest) -> Self {
        Self {
            event_id: request.event_id.clone(),
            seat_id: request.seat_id.clone(),
            user_email: request.user_email.clone(),
            status: ReservationStatus::Confirmed,
        }
    }

    /// Attaches the store-assigned identity, producing the durable record.
    pub fn into_record(self, id: ReservationId, created_at: DateTime<Utc>) -> ReservationRecord {
        ReservationRecord {
            id,
            event_id: self.event_id,
            seat_id: self.seat_id,
            user_email: self.user_email,
            status: self.status,
            created_at,
        }
    }
}

/// A durably stored reservation. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationRecord {
    pub id: ReservationId,
    pub event_id: EventId,
    pub seat_id: SeatId,
    pub user_email: String,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
}
