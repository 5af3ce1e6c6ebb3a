use crate::{
    db_types::{NewPayment, Payment, Settlement},
    traits::LedgerError,
};

/// The persistent record of checkout attempts.
///
/// Payments are created when an order is requested and are never deleted. After creation, only the reconciliation
/// engine mutates them, and status transitions that carry side effects go through the conditional
/// [`complete_payment`](Self::complete_payment) and [`fail_payment`](Self::fail_payment) methods.
#[allow(async_fn_in_trait)]
pub trait OrderLedger {
    /// Stores a new payment with status `created`.
    async fn insert_payment(&self, payment: NewPayment) -> Result<Payment, LedgerError>;

    async fn fetch_payment(&self, id: i64) -> Result<Option<Payment>, LedgerError>;

    async fn fetch_payment_by_provider_order_id(&self, provider_order_id: &str)
        -> Result<Option<Payment>, LedgerError>;

    async fn fetch_payment_by_provider_payment_id(
        &self,
        provider_payment_id: &str,
    ) -> Result<Option<Payment>, LedgerError>;

    /// The most recently created payment for the user, if any.
    async fn fetch_latest_payment_for_user(&self, user_id: &str) -> Result<Option<Payment>, LedgerError>;

    /// All the user's payments, most recent first.
    async fn fetch_payments_for_user(&self, user_id: &str) -> Result<Vec<Payment>, LedgerError>;

    /// Persists every mutable field of `payment` and bumps `updated_at` in a single write.
    async fn update_payment(&self, payment: &Payment) -> Result<Payment, LedgerError>;

    /// Sets the provider payment id, signature and verification metadata, and moves the payment to `completed`, but
    /// only if it is currently `created`, `pending` or `failed`. Returns `None` if the guard failed.
    async fn complete_payment(&self, id: i64, settlement: &Settlement) -> Result<Option<Payment>, LedgerError>;

    /// Moves the payment to `failed`, but only if it is currently `created` or `pending`. Returns `None` if the guard
    /// failed.
    async fn fail_payment(&self, id: i64) -> Result<Option<Payment>, LedgerError>;
}
