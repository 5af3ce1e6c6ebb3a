use serde::{Deserialize, Serialize};

use crate::db_types::{MinorUnits, Payment, PaymentNotes};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrderRequest {
    /// Amount in minor units (e.g. paise)
    pub amount: MinorUnits,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub receipt: String,
    #[serde(default)]
    pub notes: PaymentNotes,
}

fn default_currency() -> String {
    rcg_common::DEFAULT_CURRENCY_CODE.to_string()
}

impl NewOrderRequest {
    pub fn new<S: Into<String>>(amount: MinorUnits, receipt: S) -> Self {
        Self { amount, currency: default_currency(), receipt: receipt.into(), notes: PaymentNotes::default() }
    }

    pub fn with_notes(mut self, notes: PaymentNotes) -> Self {
        self.notes = notes;
        self
    }
}

/// The result of a successful order creation: what the checkout front-end needs to open the provider's payment form.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedOrder {
    /// The provider's order id
    pub order_id: String,
    pub amount: MinorUnits,
    pub currency: String,
    /// The provider's public key
    pub key_id: String,
    pub payment: Payment,
}
