use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewPayment, Payment, PaymentRow, PaymentStatus, Settlement},
    traits::LedgerError,
};

/// Renders a list of statuses as the body of an SQL `IN (...)` clause. Statuses are a closed set of literals, so no
/// binding is needed.
fn status_list(statuses: &[PaymentStatus]) -> String {
    statuses.iter().map(|s| format!("'{s}'")).collect::<Vec<String>>().join(",")
}

/// Inserts a new payment with status `created`. Fails with [`LedgerError::PaymentAlreadyExists`] if the order id has
/// been used before.
pub async fn insert_payment(payment: NewPayment, conn: &mut SqliteConnection) -> Result<Payment, LedgerError> {
    let notes = serde_json::to_string(&payment.notes)?;
    let row: PaymentRow = sqlx::query_as(
        r#"
            INSERT INTO payments (
                order_id,
                user_id,
                amount,
                currency,
                receipt,
                notes,
                status,
                provider,
                provider_order_id
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *;
        "#,
    )
    .bind(payment.order_id)
    .bind(payment.user_id)
    .bind(payment.amount)
    .bind(payment.currency)
    .bind(payment.receipt)
    .bind(notes)
    .bind(PaymentStatus::Created)
    .bind(payment.provider)
    .bind(payment.provider_order_id)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Payment [{}] inserted with id {}", row.order_id, row.id);
    Ok(row.into())
}

pub async fn fetch_payment(id: i64, conn: &mut SqliteConnection) -> Result<Option<Payment>, LedgerError> {
    let row: Option<PaymentRow> =
        sqlx::query_as("SELECT * FROM payments WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(row.map(Payment::from))
}

/// Returns the most recent payment for the given provider order id
pub async fn fetch_payment_by_provider_order_id(
    provider_order_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, LedgerError> {
    let row: Option<PaymentRow> =
        sqlx::query_as("SELECT * FROM payments WHERE provider_order_id = $1 ORDER BY created_at DESC, id DESC LIMIT 1")
            .bind(provider_order_id)
            .fetch_optional(conn)
            .await?;
    Ok(row.map(Payment::from))
}

pub async fn fetch_payment_by_provider_payment_id(
    provider_payment_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, LedgerError> {
    let row: Option<PaymentRow> = sqlx::query_as("SELECT * FROM payments WHERE provider_payment_id = $1")
        .bind(provider_payment_id)
        .fetch_optional(conn)
        .await?;
    Ok(row.map(Payment::from))
}

pub async fn fetch_latest_payment_for_user(
    user_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, LedgerError> {
    let row: Option<PaymentRow> =
        sqlx::query_as("SELECT * FROM payments WHERE user_id = $1 ORDER BY created_at DESC, id DESC LIMIT 1")
            .bind(user_id)
            .fetch_optional(conn)
            .await?;
    Ok(row.map(Payment::from))
}

/// Fetches all payments for the user, most recent first
pub async fn fetch_payments_for_user(user_id: &str, conn: &mut SqliteConnection) -> Result<Vec<Payment>, LedgerError> {
    let rows: Vec<PaymentRow> =
        sqlx::query_as("SELECT * FROM payments WHERE user_id = $1 ORDER BY created_at DESC, id DESC")
            .bind(user_id)
            .fetch_all(conn)
            .await?;
    trace!("🗃️ {} payments fetched for user {user_id}", rows.len());
    Ok(rows.into_iter().map(Payment::from).collect())
}

/// Writes every mutable field of the payment back to the database in a single statement.
pub async fn update_payment(payment: &Payment, conn: &mut SqliteConnection) -> Result<Payment, LedgerError> {
    let notes = serde_json::to_string(&payment.notes)?;
    let verification = payment.verification.as_ref().map(serde_json::to_string).transpose()?;
    let row: Option<PaymentRow> = sqlx::query_as(
        r#"
            UPDATE payments SET
                amount = $1,
                currency = $2,
                receipt = $3,
                notes = $4,
                verification = $5,
                status = $6,
                provider_order_id = $7,
                provider_payment_id = $8,
                provider_signature = $9,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $10
            RETURNING *;
        "#,
    )
    .bind(payment.amount)
    .bind(&payment.currency)
    .bind(&payment.receipt)
    .bind(notes)
    .bind(verification)
    .bind(payment.status)
    .bind(&payment.provider_order_id)
    .bind(&payment.provider_payment_id)
    .bind(&payment.provider_signature)
    .bind(payment.id)
    .fetch_optional(conn)
    .await?;
    row.map(Payment::from).ok_or(LedgerError::PaymentNotFound(payment.id))
}

/// Conditionally moves the payment into `completed`. The guard and the write are one statement, so concurrent callers
/// cannot both succeed.
pub async fn complete_payment(
    id: i64,
    settlement: &Settlement,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, LedgerError> {
    let verification = serde_json::to_string(&settlement.verification)?;
    let sql = format!(
        r#"
            UPDATE payments SET
                status = $1,
                provider_payment_id = $2,
                provider_signature = $3,
                verification = $4,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $5 AND status IN ({})
            RETURNING *;
        "#,
        status_list(&PaymentStatus::COMPLETABLE)
    );
    let row: Option<PaymentRow> = sqlx::query_as(&sql)
        .bind(PaymentStatus::Completed)
        .bind(&settlement.provider_payment_id)
        .bind(&settlement.provider_signature)
        .bind(verification)
        .bind(id)
        .fetch_optional(conn)
        .await?;
    match &row {
        Some(_) => debug!("🗃️ Payment #{id} completed with provider payment {}", settlement.provider_payment_id),
        None => trace!("🗃️ Payment #{id} was not in a completable state"),
    }
    Ok(row.map(Payment::from))
}

/// Conditionally moves the payment into `failed`.
pub async fn fail_payment(id: i64, conn: &mut SqliteConnection) -> Result<Option<Payment>, LedgerError> {
    let sql = format!(
        "UPDATE payments SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 AND status IN ({}) RETURNING *",
        status_list(&PaymentStatus::FAILABLE)
    );
    let row: Option<PaymentRow> =
        sqlx::query_as(&sql).bind(PaymentStatus::Failed).bind(id).fetch_optional(conn).await?;
    if row.is_some() {
        debug!("🗃️ Payment #{id} marked as failed");
    }
    Ok(row.map(Payment::from))
}
