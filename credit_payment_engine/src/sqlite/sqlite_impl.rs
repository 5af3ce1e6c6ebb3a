//! `SqliteDatabase` is a concrete implementation of a credit payment engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
//!
//! Every operation except [`CheckoutDatabase::settle_payment`] is a single statement executed in autocommit mode.
//! Settlement runs in a transaction whose first statement is the conditional status update, so the write lock is taken
//! up front and concurrent settlements of the same payment are serialised by SQLite.
use std::fmt::Debug;

use log::*;
use sqlx::{migrate, SqlitePool};

use super::db::{audit_log, db_url, new_pool, payments, users};
use crate::{
    db_types::{
        AuditLogEntry,
        AuditStatus,
        CreditGrant,
        NewAuditLogEntry,
        NewPayment,
        NewUserAccount,
        Payment,
        SettledPayment,
        Settlement,
        UserAccount,
    },
    traits::{AuditLog, BalanceLedger, CheckoutDatabase, LedgerError, OrderLedger},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl CheckoutDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn settle_payment(
        &self,
        id: i64,
        settlement: Settlement,
        grant: CreditGrant,
    ) -> Result<Option<SettledPayment>, LedgerError> {
        let mut tx = self.pool.begin().await?;
        let payment = match payments::complete_payment(id, &settlement, &mut tx).await? {
            Some(p) => p,
            None => {
                // Nothing was written. Dropping the transaction rolls it back.
                return Ok(None);
            },
        };
        let total_credits = users::increment_credits(&grant.user_id, grant.credits, &mut tx).await?;
        if let Some(tier) = grant.subscription.as_deref() {
            users::update_subscription(&grant.user_id, tier, &mut tx).await?;
        }
        tx.commit().await?;
        info!(
            "🗃️ Payment #{id} settled. {} credits granted to {}. New balance: {total_credits}",
            grant.credits, grant.user_id
        );
        Ok(Some(SettledPayment { payment, total_credits }))
    }
}

impl OrderLedger for SqliteDatabase {
    async fn insert_payment(&self, payment: NewPayment) -> Result<Payment, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        payments::insert_payment(payment, &mut conn).await
    }

    async fn fetch_payment(&self, id: i64) -> Result<Option<Payment>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        payments::fetch_payment(id, &mut conn).await
    }

    async fn fetch_payment_by_provider_order_id(
        &self,
        provider_order_id: &str,
    ) -> Result<Option<Payment>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        payments::fetch_payment_by_provider_order_id(provider_order_id, &mut conn).await
    }

    async fn fetch_payment_by_provider_payment_id(
        &self,
        provider_payment_id: &str,
    ) -> Result<Option<Payment>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        payments::fetch_payment_by_provider_payment_id(provider_payment_id, &mut conn).await
    }

    async fn fetch_latest_payment_for_user(&self, user_id: &str) -> Result<Option<Payment>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        payments::fetch_latest_payment_for_user(user_id, &mut conn).await
    }

    async fn fetch_payments_for_user(&self, user_id: &str) -> Result<Vec<Payment>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        payments::fetch_payments_for_user(user_id, &mut conn).await
    }

    async fn update_payment(&self, payment: &Payment) -> Result<Payment, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        payments::update_payment(payment, &mut conn).await
    }

    async fn complete_payment(&self, id: i64, settlement: &Settlement) -> Result<Option<Payment>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        payments::complete_payment(id, settlement, &mut conn).await
    }

    async fn fail_payment(&self, id: i64) -> Result<Option<Payment>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        payments::fail_payment(id, &mut conn).await
    }
}

impl AuditLog for SqliteDatabase {
    async fn upsert_log(&self, entry: NewAuditLogEntry) -> Result<AuditLogEntry, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        audit_log::upsert_log(entry, &mut conn).await
    }

    async fn fetch_log_by_txnid(&self, txnid: &str) -> Result<Option<AuditLogEntry>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        audit_log::fetch_log_by_txnid(txnid, &mut conn).await
    }

    async fn fetch_logs(&self, status: Option<AuditStatus>) -> Result<Vec<AuditLogEntry>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        audit_log::fetch_logs(status, &mut conn).await
    }
}

impl BalanceLedger for SqliteDatabase {
    async fn fetch_user_account(&self, user_id: &str) -> Result<Option<UserAccount>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        users::fetch_user_account(user_id, &mut conn).await
    }

    async fn create_user_account(&self, account: NewUserAccount) -> Result<UserAccount, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        users::idempotent_insert(account, &mut conn).await
    }

    async fn increment_credits(&self, user_id: &str, delta: i64) -> Result<i64, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        users::increment_credits(user_id, delta, &mut conn).await
    }

    async fn update_subscription(&self, user_id: &str, tier: &str) -> Result<(), LedgerError> {
        let mut conn = self.pool.acquire().await?;
        users::update_subscription(user_id, tier, &mut conn).await
    }
}

impl SqliteDatabase {
    /// Creates a new database API object
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Applies any outstanding schema migrations.
    pub async fn run_migrations(&self) -> Result<(), LedgerError> {
        migrate!("./src/sqlite/migrations")
            .run(&self.pool)
            .await
            .map_err(|e| LedgerError::DatabaseError(format!("Migration failed. {e}")))?;
        info!("🗃️ Migrations complete");
        Ok(())
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&mut self) {
        self.pool.close().await;
    }
}
