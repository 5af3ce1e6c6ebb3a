use thiserror::Error;

use crate::{
    db_types::{CreditGrant, SettledPayment, Settlement},
    traits::{AuditLog, BalanceLedger, OrderLedger},
};

/// The highest level of behaviour for backends supporting the reconciliation engine.
#[allow(async_fn_in_trait)]
pub trait CheckoutDatabase: Clone + OrderLedger + AuditLog + BalanceLedger {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Settles the payment with internal id `id`, in a single atomic transaction:
    /// * conditionally completes the payment (see [`OrderLedger::complete_payment`]),
    /// * if, and only if, that transition happened, increments the user's balance by `grant.credits` and sets their
    ///   subscription tier when one is given.
    ///
    /// Returns `None` when the payment was not in a completable state, in which case nothing was changed.
    async fn settle_payment(
        &self,
        id: i64,
        settlement: Settlement,
        grant: CreditGrant,
    ) -> Result<Option<SettledPayment>, LedgerError>;
}

#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    #[error("We have an internal database engine (configuration/uptime etc.) : {0}")]
    DatabaseError(String),
    #[error("A payment with {0} already exists")]
    PaymentAlreadyExists(String),
    #[error("The requested payment (internal id {0}) does not exist")]
    PaymentNotFound(i64),
    #[error("The user {0} does not exist")]
    UserNotFound(String),
    #[error("Could not serialize {0}")]
    SerializationError(String),
}

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        match e.as_database_error() {
            Some(db) if db.is_unique_violation() => LedgerError::PaymentAlreadyExists(db.message().to_string()),
            _ => LedgerError::DatabaseError(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(e: serde_json::Error) -> Self {
        LedgerError::SerializationError(e.to_string())
    }
}
