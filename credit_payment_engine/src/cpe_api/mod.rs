//! # Credit payment engine public API
//!
//! The `cpe_api` module exposes the programmatic API for the credit payment engine. Each API wraps a storage backend
//! (and, where it talks to the payment provider, a [`PaymentProvider`](crate::traits::PaymentProvider)) and is
//! constructed explicitly by its owner. Nothing here holds global state.
//!
//! * [`checkout_api`] creates orders with the payment provider and records them in the order ledger.
//! * [`reconciliation_api`] verifies completed checkouts against the provider and settles them exactly once.
//! * [`history_api`] lists a user's payments.
//! * [`audit_log_api`] reads the audit log.
//!
//! The other submodules hold the request and response types for these APIs.
//!
//! # API usage
//!
//! ```rust,ignore
//! use credit_payment_engine::{ReconciliationApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! let api = ReconciliationApi::new(db, gateway, producers, config);
//! let outcome = api.verify_payment("user_42", request).await?;
//! ```

pub mod audit_log_api;
pub mod checkout_api;
pub mod checkout_objects;
pub mod errors;
pub mod history_api;
pub mod history_objects;
pub mod reconciliation_api;
pub mod verification_objects;
