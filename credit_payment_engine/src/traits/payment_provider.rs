use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::db_types::MinorUnits;

/// Provider payment states that count as "money has moved"
pub const CAPTURED_STATUSES: [&str; 2] = ["captured", "authorized"];

/// The adapter to an external payment provider.
///
/// Implementations are expected to bound their own network calls, but the engine additionally wraps every call in its
/// configured gateway timeout.
#[allow(async_fn_in_trait)]
pub trait PaymentProvider {
    /// A short, lowercase name for the provider, stored with every payment (e.g. `razorpay`).
    fn name(&self) -> &str;

    /// The public key that the checkout front-end needs in order to open the provider's payment form.
    fn public_key(&self) -> &str;

    async fn create_order(&self, order: ProviderOrderRequest) -> Result<ProviderOrder, PaymentProviderError>;

    async fn fetch_payment(&self, payment_id: &str) -> Result<ProviderPayment, PaymentProviderError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderOrderRequest {
    pub amount: MinorUnits,
    pub currency: String,
    pub receipt: String,
    pub notes: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderOrder {
    pub provider_order_id: String,
    pub amount: MinorUnits,
    pub currency: String,
    pub receipt: Option<String>,
    pub status: String,
}

/// The authoritative record of a payment, as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderPayment {
    pub id: String,
    pub amount: MinorUnits,
    pub status: String,
    pub order_id: Option<String>,
    pub currency: String,
    pub method: Option<String>,
    pub email: Option<String>,
}

impl ProviderPayment {
    pub fn is_captured(&self) -> bool {
        CAPTURED_STATUSES.contains(&self.status.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentProviderError {
    #[error("Could not reach the payment provider. {0}")]
    Network(String),
    #[error("The payment provider does not know about {0}")]
    NotFound(String),
    #[error("The payment provider is rate limiting requests")]
    RateLimited,
    #[error("The payment provider sent a response we could not understand. {0}")]
    InvalidResponse(String),
    #[error("The payment provider did not respond in time")]
    Timeout,
    #[error("The payment provider rejected the request. {0}")]
    Rejected(String),
}

impl PaymentProviderError {
    /// Failures that may succeed if the same request is repeated later
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::RateLimited | Self::Timeout)
    }
}
