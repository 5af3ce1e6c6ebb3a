use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
pub use rcg_common::MinorUnits;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Invalid status: {0}")]
pub struct ConversionError(String);

//--------------------------------------     PaymentStatus     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// An order has been requested from the provider, and the customer has not completed checkout yet.
    Created,
    /// Checkout is in progress.
    Pending,
    /// The payment was verified against the provider and credits were granted. This is terminal.
    Completed,
    /// Verification failed. The order may still be completed by a later successful verification.
    Failed,
    /// The order was abandoned. This is terminal.
    Cancelled,
}

impl PaymentStatus {
    /// The states from which a payment may still be completed
    pub const COMPLETABLE: [PaymentStatus; 3] = [PaymentStatus::Created, PaymentStatus::Pending, PaymentStatus::Failed];
    /// The states from which a payment may be marked as failed
    pub const FAILABLE: [PaymentStatus; 2] = [PaymentStatus::Created, PaymentStatus::Pending];

    /// `Completed` and `Cancelled` are final. `Failed` is not: a failed verification does not refund anything, so a
    /// later verification that the provider confirms as captured still completes the payment and grants the credits.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Completed | PaymentStatus::Cancelled)
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Created => write!(f, "created"),
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Completed => write!(f, "completed"),
            PaymentStatus::Failed => write!(f, "failed"),
            PaymentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(Self::Created),
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid payment status: {s}"))),
        }
    }
}

//--------------------------------------      AuditStatus      ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AuditStatus {
    Pending,
    Completed,
    Failed,
    /// Verification was interrupted by an internal error after the provider confirmed the payment.
    Incomplete,
}

impl Display for AuditStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditStatus::Pending => write!(f, "pending"),
            AuditStatus::Completed => write!(f, "completed"),
            AuditStatus::Failed => write!(f, "failed"),
            AuditStatus::Incomplete => write!(f, "incomplete"),
        }
    }
}

impl FromStr for AuditStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "incomplete" => Ok(Self::Incomplete),
            s => Err(ConversionError(format!("Invalid audit status: {s}"))),
        }
    }
}

impl From<PaymentStatus> for AuditStatus {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Completed => AuditStatus::Completed,
            PaymentStatus::Created | PaymentStatus::Pending => AuditStatus::Pending,
            PaymentStatus::Failed | PaymentStatus::Cancelled => AuditStatus::Failed,
        }
    }
}

//--------------------------------------      PaymentNotes     ---------------------------------------------------------
/// Free-form notes supplied by the client when the order is created. The checkout front-end sends the plan name as
/// `tierName`; anything else it sends is preserved in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentNotes {
    #[serde(rename = "tierName", alias = "tier_name", default, skip_serializing_if = "Option::is_none")]
    pub tier_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PaymentNotes {
    pub fn is_empty(&self) -> bool {
        self.tier_name.is_none() && self.credits.is_none() && self.extra.is_empty()
    }

    /// The notes as a JSON object, as the payment provider expects them
    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

//----------------------------------   VerificationMetadata    ---------------------------------------------------------
/// What the provider reported about a payment at the moment it was verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationMetadata {
    pub provider_status: String,
    pub provider_amount: MinorUnits,
    pub provider_currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    pub credits_granted: i64,
    pub verified_at: DateTime<Utc>,
}

//--------------------------------------        Payment        ---------------------------------------------------------
/// One checkout attempt. Created when an order is requested, and mutated only by reconciliation afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Payment {
    pub id: i64,
    /// The internally generated order id, `RZP_{user}_{millis}_{rand}`
    pub order_id: String,
    pub user_id: String,
    pub amount: MinorUnits,
    pub currency: String,
    pub receipt: String,
    pub notes: PaymentNotes,
    pub verification: Option<VerificationMetadata>,
    pub status: PaymentStatus,
    pub provider: String,
    pub provider_order_id: Option<String>,
    pub provider_payment_id: Option<String>,
    pub provider_signature: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// Credits granted when this payment was completed, or zero if it never was.
    pub fn credits_granted(&self) -> i64 {
        self.verification.as_ref().map(|v| v.credits_granted).unwrap_or(0)
    }
}

/// The storage representation of [`Payment`]. The structured columns are kept as JSON text.
#[derive(Debug, Clone, FromRow)]
pub struct PaymentRow {
    pub id: i64,
    pub order_id: String,
    pub user_id: String,
    pub amount: MinorUnits,
    pub currency: String,
    pub receipt: String,
    pub notes: String,
    pub verification: Option<String>,
    pub status: PaymentStatus,
    pub provider: String,
    pub provider_order_id: Option<String>,
    pub provider_payment_id: Option<String>,
    pub provider_signature: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PaymentRow> for Payment {
    fn from(row: PaymentRow) -> Self {
        let notes = serde_json::from_str(&row.notes).unwrap_or_else(|e| {
            error!("🗃️ Payment #{} has malformed notes ({e}). They will be ignored.", row.id);
            PaymentNotes::default()
        });
        let verification = row.verification.as_deref().and_then(|v| {
            serde_json::from_str(v)
                .map_err(|e| error!("🗃️ Payment #{} has malformed verification metadata. {e}", row.id))
                .ok()
        });
        Self {
            id: row.id,
            order_id: row.order_id,
            user_id: row.user_id,
            amount: row.amount,
            currency: row.currency,
            receipt: row.receipt,
            notes,
            verification,
            status: row.status,
            provider: row.provider,
            provider_order_id: row.provider_order_id,
            provider_payment_id: row.provider_payment_id,
            provider_signature: row.provider_signature,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

//--------------------------------------       NewPayment      ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub order_id: String,
    pub user_id: String,
    pub amount: MinorUnits,
    pub currency: String,
    pub receipt: String,
    pub notes: PaymentNotes,
    /// The payment provider's name, e.g. `razorpay`
    pub provider: String,
    pub provider_order_id: Option<String>,
}

impl NewPayment {
    pub fn new(order_id: String, user_id: String, amount: MinorUnits, receipt: String) -> Self {
        Self {
            order_id,
            user_id,
            amount,
            currency: rcg_common::DEFAULT_CURRENCY_CODE.to_string(),
            receipt,
            notes: PaymentNotes::default(),
            provider: "razorpay".to_string(),
            provider_order_id: None,
        }
    }

    pub fn with_provider<S: Into<String>>(mut self, provider: S) -> Self {
        self.provider = provider.into();
        self
    }

    pub fn with_provider_order_id<S: Into<String>>(mut self, id: S) -> Self {
        self.provider_order_id = Some(id.into());
        self
    }

    pub fn with_notes(mut self, notes: PaymentNotes) -> Self {
        self.notes = notes;
        self
    }

    pub fn with_currency<S: Into<String>>(mut self, currency: S) -> Self {
        self.currency = currency.into();
        self
    }
}

//--------------------------------------       Settlement      ---------------------------------------------------------
/// Everything needed to move a payment into the `completed` state.
#[derive(Debug, Clone)]
pub struct Settlement {
    pub provider_payment_id: String,
    pub provider_signature: Option<String>,
    pub verification: VerificationMetadata,
}

/// The balance-side effects of a successful settlement. These are applied in the same transaction as the status change.
#[derive(Debug, Clone)]
pub struct CreditGrant {
    pub user_id: String,
    pub credits: i64,
    pub subscription: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SettledPayment {
    pub payment: Payment,
    /// The user's credit balance after the grant
    pub total_credits: i64,
}

//--------------------------------------     AuditLogEntry     ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: i64,
    pub txnid: String,
    pub status: AuditStatus,
    pub amount: MinorUnits,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAuditLogEntry {
    pub txnid: String,
    pub status: AuditStatus,
    pub amount: MinorUnits,
    pub created_at: DateTime<Utc>,
}

impl NewAuditLogEntry {
    pub fn new<S: Into<String>>(txnid: S, status: AuditStatus, amount: MinorUnits) -> Self {
        Self { txnid: txnid.into(), status, amount, created_at: Utc::now() }
    }
}

//--------------------------------------      UserAccount      ---------------------------------------------------------
/// The parts of a user record that checkout reads or writes. Users are managed elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct UserAccount {
    pub id: String,
    pub email: String,
    pub name: String,
    pub credit_point: i64,
    pub subscription: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUserAccount {
    pub id: String,
    pub email: String,
    pub name: String,
    pub credit_point: i64,
}

impl NewUserAccount {
    pub fn new<S: Into<String>>(id: S, email: S, name: S) -> Self {
        Self { id: id.into(), email: email.into(), name: name.into(), credit_point: 0 }
    }

    pub fn with_credits(mut self, credits: i64) -> Self {
        self.credit_point = credits;
        self
    }
}
