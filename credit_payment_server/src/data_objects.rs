use std::fmt::Display;

use credit_payment_engine::{
    checkout_objects::CreatedOrder,
    db_types::{AuditStatus, MinorUnits},
    verification_objects::{VerificationOutcome, VerificationRequest},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new<S: Display>(message: S) -> Self {
        Self { message: message.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrderResponse {
    pub order_id: String,
    pub amount: MinorUnits,
    pub currency: String,
    pub key_id: String,
}

impl From<CreatedOrder> for CreateOrderResponse {
    fn from(order: CreatedOrder) -> Self {
        Self { order_id: order.order_id, amount: order.amount, currency: order.currency, key_id: order.key_id }
    }
}

/// The fields the checkout form posts back after the customer pays
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyPaymentParams {
    #[serde(default)]
    pub razorpay_order_id: Option<String>,
    #[serde(default)]
    pub razorpay_payment_id: Option<String>,
    #[serde(default)]
    pub razorpay_signature: Option<String>,
    #[serde(default)]
    pub amount: Option<MinorUnits>,
    #[serde(default)]
    pub credits: i64,
    #[serde(default)]
    pub subscription: Option<String>,
}

impl From<VerifyPaymentParams> for VerificationRequest {
    fn from(params: VerifyPaymentParams) -> Self {
        Self {
            provider_order_id: params.razorpay_order_id,
            provider_payment_id: params.razorpay_payment_id,
            provider_signature: params.razorpay_signature,
            claimed_amount: params.amount,
            credits: params.credits,
            subscription: params.subscription,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyPaymentResponse {
    pub status: VerifyStatus,
    pub credits_added: i64,
    pub total_credits: i64,
}

impl From<VerificationOutcome> for VerifyPaymentResponse {
    fn from(outcome: VerificationOutcome) -> Self {
        Self {
            status: VerifyStatus::Success,
            credits_added: outcome.credits_added,
            total_credits: outcome.total_credits,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogQuery {
    pub status: Option<AuditStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogIdQuery {
    pub txn_id: String,
}
