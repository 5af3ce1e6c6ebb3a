use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db_types::{MinorUnits, Payment, PaymentNotes, PaymentStatus, UserAccount};

/// One row of a user's payment history, decorated with the user's current standing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentHistoryEntry {
    pub id: i64,
    /// The provider order id, without the provider's `order_` prefix
    pub order_id: String,
    pub amount: MinorUnits,
    pub currency: String,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub plan: PaymentNotes,
    pub join_date: Option<DateTime<Utc>>,
    pub remaining_credits: i64,
}

impl PaymentHistoryEntry {
    pub fn new(payment: Payment, user: Option<&UserAccount>) -> Self {
        let order_id = payment
            .provider_order_id
            .as_deref()
            .and_then(|id| id.rsplit('_').next())
            .unwrap_or_default()
            .to_string();
        Self {
            id: payment.id,
            order_id,
            amount: payment.amount,
            currency: payment.currency,
            status: payment.status,
            created_at: payment.created_at,
            updated_at: Some(payment.updated_at),
            plan: payment.notes,
            join_date: user.map(|u| u.created_at),
            remaining_credits: user.map(|u| u.credit_point).unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentHistory {
    pub payments: Vec<PaymentHistoryEntry>,
}
