use std::time::Duration;

use rcg_common::Secret;
use serde::{Deserialize, Serialize};

use crate::db_types::{MinorUnits, Payment};

pub const DEFAULT_GATEWAY_TIMEOUT: Duration = Duration::from_secs(10);

/// A client's claim that a checkout has completed, made up of the identifiers the provider handed back to the
/// checkout form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRequest {
    pub provider_order_id: Option<String>,
    pub provider_payment_id: Option<String>,
    pub provider_signature: Option<String>,
    /// The amount the client believes it paid, in minor units
    pub claimed_amount: Option<MinorUnits>,
    /// Credits to grant on success
    pub credits: i64,
    pub subscription: Option<String>,
}

impl VerificationRequest {
    pub fn new<S: Into<String>>(provider_order_id: S, provider_payment_id: S, credits: i64) -> Self {
        Self {
            provider_order_id: Some(provider_order_id.into()),
            provider_payment_id: Some(provider_payment_id.into()),
            credits,
            ..Default::default()
        }
    }

    pub fn with_signature<S: Into<String>>(mut self, signature: S) -> Self {
        self.provider_signature = Some(signature.into());
        self
    }

    pub fn with_claimed_amount(mut self, amount: MinorUnits) -> Self {
        self.claimed_amount = Some(amount);
        self
    }

    pub fn with_subscription<S: Into<String>>(mut self, tier: S) -> Self {
        self.subscription = Some(tier.into());
        self
    }

    /// The provider order id, with blank values treated as missing
    pub fn order_id(&self) -> Option<&str> {
        self.provider_order_id.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// The provider payment id, with blank values treated as missing
    pub fn payment_id(&self) -> Option<&str> {
        self.provider_payment_id.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn signature(&self) -> Option<&str> {
        self.provider_signature.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// The result of a successful verification
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationOutcome {
    pub credits_added: i64,
    pub total_credits: i64,
    pub payment: Payment,
    /// True if the payment had already been settled by an earlier (or concurrent) request, and nothing was granted by
    /// this one.
    pub replayed: bool,
}

#[derive(Debug, Clone)]
pub struct ReconciliationConfig {
    /// The shared secret used to sign checkout results
    pub key_secret: Secret<String>,
    /// Reject verification requests that carry no signature
    pub require_signature: bool,
    /// Upper bound on each call to the payment provider
    pub gateway_timeout: Duration,
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self { key_secret: Secret::default(), require_signature: true, gateway_timeout: DEFAULT_GATEWAY_TIMEOUT }
    }
}

impl ReconciliationConfig {
    pub fn new<S: Into<String>>(key_secret: S) -> Self {
        Self { key_secret: Secret::new(key_secret.into()), ..Default::default() }
    }

    pub fn with_require_signature(mut self, require: bool) -> Self {
        self.require_signature = require;
        self
    }

    pub fn with_gateway_timeout(mut self, timeout: Duration) -> Self {
        self.gateway_timeout = timeout;
        self
    }
}
