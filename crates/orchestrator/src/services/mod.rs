//! Dependency service traits and in-memory, fault-injectable implementations.

pub mod inventory;
pub mod notification;
pub mod payment;

pub use inventory::{InMemoryInventoryService, InventoryService};
pub use notification::{InMemoryNotificationService, NotificationAck, NotificationService};
pub use payment::{Fault, InMemoryPaymentService, PaymentReceipt, PaymentService};
