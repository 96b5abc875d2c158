//! Monetary amounts.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, Result};

/// Slack for binary representation error, e.g. `149.99 * 100.0`.
const SUB_CENT_TOLERANCE: f64 = 1e-6;

/// Money amount represented in cents to avoid floating point issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money {
    /// Amount in cents (e.g., 1000 = $10.00)
    cents: i64,
}

impl Money {
    /// Creates a new Money amount from cents.
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Converts a decimal amount as received on the wire (e.g. `149.99`)
    /// into cents.
    ///
    /// Amounts with more than two decimal places are rejected rather than
    /// rounded.
    pub fn from_decimal(amount: f64) -> Result<Self> {
        if !amount.is_finite() {
            return Err(DomainError::InvalidAmount(amount.to_string()));
        }
        let scaled = amount * 100.0;
        let cents = scaled.round();
        if (scaled - cents).abs() > SUB_CENT_TOLERANCE {
            return Err(DomainError::SubCentAmount(amount.to_string()));
        }
        if cents.abs() >= i64::MAX as f64 {
            return Err(DomainError::InvalidAmount(amount.to_string()));
        }
        Ok(Self {
            cents: cents as i64,
        })
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns the dollar portion (whole number).
    pub fn dollars(&self) -> i64 {
        self.cents / 100
    }

    /// Returns the cents portion (remainder after dollars).
    pub fn cents_part(&self) -> i64 {
        self.cents.abs() % 100
    }

    /// Returns the amount as a decimal number, for wire formats that expect one.
    pub fn as_decimal(&self) -> f64 {
        self.cents as f64 / 100.0
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        self.cents > 0
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.cents < 0 {
            write!(f, "-${}.{:02}", self.dollars().abs(), self.cents_part())
        } else {
            write!(f, "${}.{:02}", self.dollars(), self.cents_part())
        }
    }
}
