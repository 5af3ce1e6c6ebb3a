use serde::{Deserialize, Serialize};

use crate::db_types::{MinorUnits, Payment, UserAccount};

/// Who to tell about a payment outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub email: String,
    pub name: String,
}

impl From<&UserAccount> for Recipient {
    fn from(user: &UserAccount) -> Self {
        Self { email: user.email.clone(), name: user.name.clone() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentCompletedEvent {
    pub payment: Payment,
    pub recipient: Option<Recipient>,
    pub credits_added: i64,
    pub total_credits: i64,
}

impl PaymentCompletedEvent {
    pub fn amount(&self) -> MinorUnits {
        self.payment.amount
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentFailedEvent {
    pub payment: Payment,
    pub recipient: Option<Recipient>,
    /// The machine-readable reason for the failure
    pub reason: String,
}

impl PaymentFailedEvent {
    pub fn amount(&self) -> MinorUnits {
        self.payment.amount
    }
}
