//! # Storage and collaborator contracts
//!
//! This module defines the interfaces that the reconciliation engine consumes. The engine never touches a database or
//! an external service directly; it talks to these traits, and concrete backends (see [`crate::SqliteDatabase`])
//! implement them.
//!
//! ## Storage
//! * [`OrderLedger`] keeps one [`Payment`](crate::db_types::Payment) record per checkout attempt. Status changes that
//!   matter for correctness are conditional (compare-and-swap on the current status).
//! * [`AuditLog`] is an upsert-by-transaction-id record of every verification attempt, independent of the order
//!   ledger. It remains writable when no payment can be resolved.
//! * [`BalanceLedger`] holds the user's credit balance. Balances are only ever incremented.
//! * [`CheckoutDatabase`] ties the three together and adds the one multi-entity atomic operation: settling a payment.
//!
//! ## Collaborators
//! * [`PaymentProvider`] is the adapter to the external payment provider.
//! * [`Notifier`] delivers the outcome of a payment to the customer.
mod audit_log;
mod balance_ledger;
mod checkout_database;
mod notifier;
mod order_ledger;
mod payment_provider;

pub use audit_log::AuditLog;
pub use balance_ledger::BalanceLedger;
pub use checkout_database::{CheckoutDatabase, LedgerError};
pub use notifier::{NotificationOutcome, Notifier, NotifierError};
pub use order_ledger::OrderLedger;
pub use payment_provider::{
    PaymentProvider,
    PaymentProviderError,
    ProviderOrder,
    ProviderOrderRequest,
    ProviderPayment,
    CAPTURED_STATUSES,
};
