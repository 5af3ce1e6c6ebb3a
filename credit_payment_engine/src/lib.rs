//! Credit Payment Engine
//!
//! The credit payment engine sells prepaid credits through a third-party payment provider and makes sure that every
//! payment the provider confirms is credited exactly once, however many times (or however concurrently) the client
//! asks for it to be verified.
//!
//! The library is divided into three main sections:
//! 1. Storage ([`traits`] and the SQLite backend). The order ledger, the audit log and the balance ledger are each
//!    described by a trait, and [`SqliteDatabase`] implements all of them. You should never need to access the
//!    database directly. Instead, use the public API provided by the engine. The exception is the data types used in
//!    the database. These are defined in the [`db_types`] module and are public.
//! 2. The payment engine public API ([`mod@cpe_api`]): order creation, payment verification and reconciliation,
//!    payment history, and the audit log. The APIs are generic over the storage backend and over the
//!    [`PaymentProvider`] that stands in for the provider's REST API.
//! 3. Signature verification ([`helpers`]), a set of pure functions that check provider signatures.
//!
//! The engine also publishes events when a verification changes the state of a payment. See [`events`] for how to
//! hook into them (e.g. to send emails).
pub mod cpe_api;
pub mod db_types;
pub mod events;
pub mod helpers;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use cpe_api::{
    audit_log_api::AuditLogApi,
    checkout_api::CheckoutApi,
    checkout_objects,
    errors::{CheckoutError, VerificationError},
    history_api::HistoryApi,
    history_objects,
    reconciliation_api::ReconciliationApi,
    verification_objects,
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{
    AuditLog,
    BalanceLedger,
    CheckoutDatabase,
    LedgerError,
    OrderLedger,
    PaymentProvider,
    PaymentProviderError,
};
