//! Payment service trait and in-memory implementation.

use std::collections::VecDeque;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use domain::Money;
use uuid::Uuid;

use crate::error::ServiceError;

/// Answer from the payment gateway.
///
/// A declined charge is a valid answer, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentReceipt {
    pub approved: bool,
    pub transaction_id: String,
    pub amount: Money,
}

/// Trait for charging a customer.
#[async_trait]
pub trait PaymentService: Send + Sync {
    /// Charges `amount` to the customer identified by `user_email`.
    async fn charge(&self, amount: Money, user_email: &str)
    -> Result<PaymentReceipt, ServiceError>;
}

/// A one-shot fault consumed by the next charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// The call fails immediately.
    Fail,
    /// The call is delayed before being handled normally.
    Delay(Duration),
}

#[derive(Debug, Default)]
struct InMemoryPaymentState {
    faults: VecDeque<Fault>,
    charges: Vec<PaymentReceipt>,
    latency: Duration,
    declining: bool,
    unavailable: bool,
    calls: u64,
}

/// In-memory payment gateway with latency and fault injection.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentService {
    state: Arc<RwLock<InMemoryPaymentState>>,
}

impl InMemoryPaymentService {
    /// Creates a new in-memory payment service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a fixed delay to every charge.
    pub fn set_latency(&self, latency: Duration) {
        self.write().latency = latency;
    }

    pub fn latency(&self) -> Duration {
        self.read().latency
    }

    /// While declining, charges are answered with `approved: false`.
    pub fn set_declining(&self, declining: bool) {
        self.write().declining = declining;
    }

    /// While unavailable, every charge fails.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.write().unavailable = unavailable;
    }

    /// Queues a fault for an upcoming charge. Faults apply in order, one per call.
    pub fn push_fault(&self, fault: Fault) {
        self.write().faults.push_back(fault);
    }

    /// Number of charge attempts received.
    pub fn call_count(&self) -> u64 {
        self.read().calls
    }

    /// Approved charges, in order.
    pub fn charges(&self) -> Vec<PaymentReceipt> {
        self.read().charges.clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, InMemoryPaymentState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, InMemoryPaymentState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl PaymentService for InMemoryPaymentService {
    async fn charge(
        &self,
        amount: Money,
        _user_email: &str,
    ) -> Result<PaymentReceipt, ServiceError> {
        let (fault, latency) = {
            let mut state = self.write();
            state.calls += 1;
            (state.faults.pop_front(), state.latency)
        };

        match fault {
            Some(Fault::Fail) => {
                return Err(ServiceError::unavailable("payment", "injected failure"));
            }
            Some(Fault::Delay(delay)) => tokio::time::sleep(delay).await,
            None => {}
        }

        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let mut state = self.write();
        if state.unavailable {
            return Err(ServiceError::unavailable("payment", "gateway unavailable"));
        }

        let receipt = PaymentReceipt {
            approved: !state.declining,
            transaction_id: format!("TXN-{}", Uuid::new_v4().simple()),
            amount,
        };
        if receipt.approved {
            state.charges.push(receipt.clone());
        }

        Ok(receipt)
    }
}
