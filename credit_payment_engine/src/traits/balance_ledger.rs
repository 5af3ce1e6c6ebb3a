use crate::{
    db_types::{NewUserAccount, UserAccount},
    traits::LedgerError,
};

/// Access to the user's credit balance. The balance is never set directly; it only moves by atomic increments.
#[allow(async_fn_in_trait)]
pub trait BalanceLedger {
    async fn fetch_user_account(&self, user_id: &str) -> Result<Option<UserAccount>, LedgerError>;

    /// Registers a user with the ledger. Returns the existing record if the user is already known.
    async fn create_user_account(&self, account: NewUserAccount) -> Result<UserAccount, LedgerError>;

    /// Atomically adds `delta` to the user's balance and returns the new balance.
    async fn increment_credits(&self, user_id: &str, delta: i64) -> Result<i64, LedgerError>;

    async fn update_subscription(&self, user_id: &str, tier: &str) -> Result<(), LedgerError>;
}
