//! Read-only access to the payment audit log.
use std::fmt::Debug;

use crate::{
    db_types::{AuditLogEntry, AuditStatus},
    traits::{AuditLog, LedgerError},
};

pub struct AuditLogApi<B> {
    db: B,
}

impl<B: Debug> Debug for AuditLogApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AuditLogApi ({:?})", self.db)
    }
}

impl<B> AuditLogApi<B>
where B: AuditLog
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Every log entry, or only those with the given status, most recent first.
    pub async fn logs(&self, status: Option<AuditStatus>) -> Result<Vec<AuditLogEntry>, LedgerError> {
        self.db.fetch_logs(status).await
    }

    pub async fn log_by_txnid(&self, txnid: &str) -> Result<Option<AuditLogEntry>, LedgerError> {
        self.db.fetch_log_by_txnid(txnid).await
    }
}
