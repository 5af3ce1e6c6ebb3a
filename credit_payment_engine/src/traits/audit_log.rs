use crate::{
    db_types::{AuditLogEntry, AuditStatus, NewAuditLogEntry},
    traits::LedgerError,
};

/// An upsert-by-`txnid` record of verification attempts. There are no deletes.
#[allow(async_fn_in_trait)]
pub trait AuditLog {
    /// Inserts the entry, or overwrites the status, amount and timestamp of the existing entry with the same `txnid`.
    async fn upsert_log(&self, entry: NewAuditLogEntry) -> Result<AuditLogEntry, LedgerError>;

    async fn fetch_log_by_txnid(&self, txnid: &str) -> Result<Option<AuditLogEntry>, LedgerError>;

    /// Fetches log entries, most recent first, optionally restricted to those with the given status.
    async fn fetch_logs(&self, status: Option<AuditStatus>) -> Result<Vec<AuditLogEntry>, LedgerError>;
}
