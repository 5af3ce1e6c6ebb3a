use thiserror::Error;

use crate::{
    db_types::MinorUnits,
    traits::{LedgerError, PaymentProviderError},
};

/// Everything that can go wrong while verifying a payment. Each variant maps to one stable, machine-readable
/// [`reason`](VerificationError::reason) that is safe to return to clients.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    #[error("Payment ID is missing. The payment did not complete at the provider.")]
    PaymentIdMissing,
    #[error("Invalid verification request. {0}")]
    InvalidRequest(String),
    #[error("The payment signature is missing or invalid.")]
    InvalidSignature,
    #[error("Amount mismatch. Expected {expected}, but the provider reports {actual}.")]
    AmountMismatch { expected: MinorUnits, actual: MinorUnits },
    #[error("Payment not completed. Status: {0}")]
    PaymentNotCaptured(String),
    #[error("The payment belongs to order {actual}, not {expected}.")]
    OrderMismatch { expected: String, actual: String },
    #[error("Order {0} has already been settled.")]
    OrderAlreadySettled(String),
    #[error("No payment record found for {0}.")]
    PaymentNotFound(String),
    #[error("The payment provider is unavailable. {0}")]
    GatewayError(#[from] PaymentProviderError),
    #[error("Internal error while recording the payment. {0}")]
    InternalError(String),
}

impl VerificationError {
    pub fn reason(&self) -> &'static str {
        match self {
            VerificationError::PaymentIdMissing => "payment_id_missing",
            VerificationError::InvalidRequest(_) => "invalid_request",
            VerificationError::InvalidSignature => "invalid_signature",
            VerificationError::AmountMismatch { .. } => "amount_mismatch",
            VerificationError::PaymentNotCaptured(_) => "payment_not_captured",
            VerificationError::OrderMismatch { .. } => "order_mismatch",
            VerificationError::OrderAlreadySettled(_) => "order_already_settled",
            VerificationError::PaymentNotFound(_) => "payment_not_found",
            VerificationError::GatewayError(_) => "gateway_unavailable",
            VerificationError::InternalError(_) => "internal_error",
        }
    }

    /// True if the client may safely retry the same request later
    pub fn is_retryable(&self) -> bool {
        matches!(self, VerificationError::GatewayError(_))
    }
}

impl From<LedgerError> for VerificationError {
    fn from(e: LedgerError) -> Self {
        VerificationError::InternalError(e.to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum CheckoutError {
    #[error("Invalid order request. {0}")]
    InvalidRequest(String),
    #[error("User {0} does not exist")]
    UserNotFound(String),
    #[error("The payment provider could not create the order. {0}")]
    GatewayError(#[from] PaymentProviderError),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<LedgerError> for CheckoutError {
    fn from(e: LedgerError) -> Self {
        CheckoutError::DatabaseError(e.to_string())
    }
}
