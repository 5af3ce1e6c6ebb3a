use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewUserAccount, UserAccount},
    traits::LedgerError,
};

pub async fn fetch_user_account(user_id: &str, conn: &mut SqliteConnection) -> Result<Option<UserAccount>, LedgerError> {
    let account = sqlx::query_as("SELECT * FROM users WHERE id = $1").bind(user_id).fetch_optional(conn).await?;
    Ok(account)
}

/// Inserts the user if they are not known yet, and returns the stored record either way.
pub async fn idempotent_insert(account: NewUserAccount, conn: &mut SqliteConnection) -> Result<UserAccount, LedgerError> {
    let id = account.id.clone();
    let result = sqlx::query(
        "INSERT INTO users (id, email, name, credit_point) VALUES ($1, $2, $3, $4) ON CONFLICT(id) DO NOTHING",
    )
    .bind(account.id)
    .bind(account.email)
    .bind(account.name)
    .bind(account.credit_point)
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() > 0 {
        debug!("🗃️ User {id} registered");
    }
    fetch_user_account(&id, conn).await?.ok_or(LedgerError::UserNotFound(id))
}

/// Adds `delta` to the user's balance in one statement and returns the new balance.
pub async fn increment_credits(user_id: &str, delta: i64, conn: &mut SqliteConnection) -> Result<i64, LedgerError> {
    let balance: Option<i64> =
        sqlx::query_scalar("UPDATE users SET credit_point = credit_point + $1 WHERE id = $2 RETURNING credit_point")
            .bind(delta)
            .bind(user_id)
            .fetch_optional(conn)
            .await?;
    let balance = balance.ok_or_else(|| LedgerError::UserNotFound(user_id.to_string()))?;
    trace!("🗃️ Balance for {user_id} adjusted by {delta} to {balance}");
    Ok(balance)
}

pub async fn update_subscription(user_id: &str, tier: &str, conn: &mut SqliteConnection) -> Result<(), LedgerError> {
    let result =
        sqlx::query("UPDATE users SET subscription = $1 WHERE id = $2").bind(tier).bind(user_id).execute(conn).await?;
    if result.rows_affected() == 0 {
        return Err(LedgerError::UserNotFound(user_id.to_string()));
    }
    debug!("🗃️ Subscription for {user_id} set to {tier}");
    Ok(())
}
