use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Request body for `POST /orders`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NewRazorpayOrder {
    /// Amount in the smallest currency unit
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub notes: Map<String, Value>,
}

impl NewRazorpayOrder {
    pub fn new(amount: i64, currency: &str, receipt: &str) -> Self {
        Self { amount, currency: currency.to_string(), receipt: receipt.to_string(), notes: Map::new() }
    }

    pub fn with_notes(mut self, notes: Map<String, Value>) -> Self {
        self.notes = notes;
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RazorpayOrder {
    pub id: String,
    #[serde(default)]
    pub entity: String,
    pub amount: i64,
    #[serde(default)]
    pub amount_paid: i64,
    #[serde(default)]
    pub amount_due: i64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub attempts: i64,
    /// Razorpay returns an empty *array* when an order has no notes, and an object otherwise.
    #[serde(default)]
    pub notes: Value,
    #[serde(default)]
    pub created_at: i64,
}

impl RazorpayOrder {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.created_at, 0).single()
    }
}

/// The subset of the Razorpay payment entity that is relevant for reconciliation.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RazorpayPayment {
    pub id: String,
    #[serde(default)]
    pub entity: String,
    pub amount: i64,
    pub currency: String,
    /// One of `created`, `authorized`, `captured`, `refunded` or `failed`
    pub status: String,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub captured: bool,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub created_at: i64,
}

impl RazorpayPayment {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.created_at, 0).single()
    }
}
