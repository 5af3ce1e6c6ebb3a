use log::trace;
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::{AuditLogEntry, AuditStatus, NewAuditLogEntry},
    traits::LedgerError,
};

/// Inserts the entry, or overwrites the status, amount and timestamp of an existing entry with the same `txnid`.
/// This is a single statement, so concurrent writers for the same transaction never produce duplicate rows.
pub async fn upsert_log(entry: NewAuditLogEntry, conn: &mut SqliteConnection) -> Result<AuditLogEntry, LedgerError> {
    let log: AuditLogEntry = sqlx::query_as(
        r#"
            INSERT INTO payment_logs (txnid, status, amount, created_at) VALUES ($1, $2, $3, $4)
            ON CONFLICT(txnid) DO UPDATE SET
                status = excluded.status,
                amount = excluded.amount,
                created_at = excluded.created_at
            RETURNING *;
        "#,
    )
    .bind(entry.txnid)
    .bind(entry.status)
    .bind(entry.amount)
    .bind(entry.created_at)
    .fetch_one(conn)
    .await?;
    trace!("🗃️ Log [{}] is now {} ({})", log.txnid, log.status, log.amount);
    Ok(log)
}

pub async fn fetch_log_by_txnid(txnid: &str, conn: &mut SqliteConnection) -> Result<Option<AuditLogEntry>, LedgerError> {
    let log = sqlx::query_as("SELECT * FROM payment_logs WHERE txnid = $1").bind(txnid).fetch_optional(conn).await?;
    Ok(log)
}

pub async fn fetch_logs(
    status: Option<AuditStatus>,
    conn: &mut SqliteConnection,
) -> Result<Vec<AuditLogEntry>, LedgerError> {
    let mut builder = QueryBuilder::new("SELECT * FROM payment_logs ");
    if let Some(status) = status {
        builder.push("WHERE status = ");
        builder.push_bind(status);
    }
    builder.push(" ORDER BY created_at DESC, id DESC");
    trace!("🗃️ Executing query: {}", builder.sql());
    let logs = builder.build_query_as::<AuditLogEntry>().fetch_all(conn).await?;
    Ok(logs)
}
