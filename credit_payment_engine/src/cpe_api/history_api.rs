//! Read-only access to a user's payment history.
use std::fmt::Debug;

use log::trace;

use crate::{
    cpe_api::history_objects::{PaymentHistory, PaymentHistoryEntry},
    traits::{BalanceLedger, LedgerError, OrderLedger},
};

/// The `HistoryApi` lists a user's payments, decorated with their current balance and join date.
pub struct HistoryApi<B> {
    db: B,
}

impl<B: Debug> Debug for HistoryApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HistoryApi ({:?})", self.db)
    }
}

impl<B> HistoryApi<B>
where B: OrderLedger + BalanceLedger
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// All payments for `user_id`, most recent first. A user with no payments (or no account) gets an empty history.
    pub async fn payment_history(&self, user_id: &str) -> Result<PaymentHistory, LedgerError> {
        let user = self.db.fetch_user_account(user_id).await?;
        let payments = self.db.fetch_payments_for_user(user_id).await?;
        trace!("🔄️ {} payments in the history of {user_id}", payments.len());
        let payments = payments.into_iter().map(|p| PaymentHistoryEntry::new(p, user.as_ref())).collect();
        Ok(PaymentHistory { payments })
    }
}
