//! # Payment verification and reconciliation
//!
//! [`ReconciliationApi::verify_payment`] takes a client's claim that a checkout has completed and checks it against
//! the payment provider's own record before settling anything:
//!
//! 1. A claim without a provider payment id means the checkout never completed. The attempt is logged as failed and
//!    the user's payment, if one can be found, is marked as failed.
//! 2. The audit log entry for the order is set to `pending`.
//! 3. The provider's record of the payment is fetched, bounded by the gateway timeout.
//! 4. The provider must report the payment as captured (or authorized), against the same order.
//! 5. A claimed amount, if given, must match the provider's amount exactly.
//! 6. The checkout signature must be valid. A missing signature is rejected unless signatures are optional.
//! 7. The payment record is resolved by provider payment id, then by provider order id. It must belong to the caller
//!    and its amount must match the provider's amount.
//! 8. The payment is settled: a conditional status change to `completed` and the credit grant, in one transaction.
//!
//! Every step returns a [`VerificationError`] on failure, and a single handler applies the terminal audit-log and
//! payment updates for whichever error it receives. Side effects (the credit grant, events) only happen for the caller
//! that actually moved the payment into `completed`; every other caller with the same provider payment id gets the
//! earlier result back.
use std::fmt::Debug;

use chrono::Utc;
use log::*;

use crate::{
    cpe_api::{
        errors::VerificationError,
        verification_objects::{ReconciliationConfig, VerificationOutcome, VerificationRequest},
    },
    db_types::{
        AuditStatus,
        CreditGrant,
        MinorUnits,
        NewAuditLogEntry,
        Payment,
        PaymentStatus,
        Settlement,
        VerificationMetadata,
    },
    events::{EventProducers, PaymentCompletedEvent, PaymentFailedEvent, Recipient},
    helpers::{failure_txn_id, verify_razorpay_signature},
    traits::{CheckoutDatabase, LedgerError, PaymentProvider, PaymentProviderError, ProviderPayment},
};

/// The state of a single verification attempt that the failure handler needs to finish the job.
#[derive(Debug)]
struct Attempt {
    user_id: String,
    /// The audit log key: the provider order id, or a synthetic id if the client did not send one
    txnid: String,
    order_id: Option<String>,
    claimed_amount: Option<MinorUnits>,
    /// The payment record this attempt refers to, once it is known
    payment: Option<Payment>,
}

impl Attempt {
    fn new(user_id: &str, request: &VerificationRequest) -> Self {
        let order_id = request.order_id().map(String::from);
        let txnid = order_id.clone().unwrap_or_else(|| failure_txn_id(user_id));
        Self { user_id: user_id.to_string(), txnid, order_id, claimed_amount: request.claimed_amount, payment: None }
    }

    /// The most trustworthy amount available: the stored payment amount, then the claimed amount.
    fn best_amount(&self) -> MinorUnits {
        self.payment.as_ref().map(|p| p.amount).or(self.claimed_amount).unwrap_or_default()
    }
}

pub struct ReconciliationApi<B, P> {
    db: B,
    provider: P,
    producers: EventProducers,
    config: ReconciliationConfig,
}

impl<B, P> Debug for ReconciliationApi<B, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReconciliationApi")
    }
}

impl<B, P> ReconciliationApi<B, P> {
    pub fn new(db: B, provider: P, producers: EventProducers, config: ReconciliationConfig) -> Self {
        Self { db, provider, producers, config }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B, P> ReconciliationApi<B, P>
where
    B: CheckoutDatabase,
    P: PaymentProvider,
{
    /// Verifies a completed checkout on behalf of `user_id` and, if everything checks out, settles the payment and
    /// grants `request.credits` to the user.
    ///
    /// Repeating a successful request returns the original result without granting anything again.
    pub async fn verify_payment(
        &self,
        user_id: &str,
        request: VerificationRequest,
    ) -> Result<VerificationOutcome, VerificationError> {
        let mut attempt = Attempt::new(user_id, &request);
        debug!("🔄️🔍️ Verifying [{}] for {user_id}", attempt.txnid);
        match self.run_verification(&request, &mut attempt).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                warn!("🔄️🔍️ Verification of [{}] for {user_id} failed. {e}", attempt.txnid);
                self.handle_failure(&mut attempt, &e).await;
                Err(e)
            },
        }
    }

    async fn run_verification(
        &self,
        request: &VerificationRequest,
        attempt: &mut Attempt,
    ) -> Result<VerificationOutcome, VerificationError> {
        let Some(payment_id) = request.payment_id() else {
            info!("🔄️🔍️ No payment id in the request. The payment probably did not complete at the provider.");
            return Err(VerificationError::PaymentIdMissing);
        };
        let Some(order_id) = attempt.order_id.clone() else {
            return Err(VerificationError::InvalidRequest("The provider order id is required".into()));
        };
        if request.credits < 0 {
            return Err(VerificationError::InvalidRequest("Credits cannot be negative".into()));
        }

        let pending_amount = request.claimed_amount.unwrap_or_default();
        self.write_log(&attempt.txnid, AuditStatus::Pending, pending_amount).await;

        let provider_payment = self.fetch_provider_payment(payment_id).await?;
        if !provider_payment.is_captured() {
            return Err(VerificationError::PaymentNotCaptured(provider_payment.status));
        }
        if let Some(actual) = provider_payment.order_id.as_deref() {
            if actual != order_id {
                let actual = actual.to_string();
                return Err(VerificationError::OrderMismatch { expected: order_id, actual });
            }
        }
        if let Some(claimed) = request.claimed_amount {
            if claimed != provider_payment.amount {
                return Err(VerificationError::AmountMismatch { expected: claimed, actual: provider_payment.amount });
            }
        }
        self.check_signature(&order_id, payment_id, request.signature())?;

        let payment = self.resolve_payment(&attempt.user_id, payment_id, &order_id).await?;
        attempt.payment = Some(payment.clone());
        if payment.amount != provider_payment.amount {
            return Err(VerificationError::AmountMismatch { expected: payment.amount, actual: provider_payment.amount });
        }
        self.commit(request, payment, provider_payment, attempt).await
    }

    async fn fetch_provider_payment(&self, payment_id: &str) -> Result<ProviderPayment, VerificationError> {
        let timeout = self.config.gateway_timeout;
        let payment = tokio::time::timeout(timeout, self.provider.fetch_payment(payment_id))
            .await
            .map_err(|_| {
                warn!("🔄️🔍️ The payment provider did not respond within {}ms", timeout.as_millis());
                PaymentProviderError::Timeout
            })??;
        trace!("🔄️🔍️ Provider reports {} as {} for {}", payment.id, payment.status, payment.amount);
        Ok(payment)
    }

    fn check_signature(&self, order_id: &str, payment_id: &str, signature: Option<&str>) -> Result<(), VerificationError> {
        match signature {
            Some(sig) => {
                if verify_razorpay_signature(self.config.key_secret.reveal(), order_id, payment_id, sig) {
                    Ok(())
                } else {
                    Err(VerificationError::InvalidSignature)
                }
            },
            None if self.config.require_signature => Err(VerificationError::InvalidSignature),
            None => {
                warn!("🔄️🔍️ Accepting unsigned verification for {payment_id} because signatures are optional");
                Ok(())
            },
        }
    }

    /// Finds the payment record by provider payment id, then by provider order id. Another user's payment is treated as
    /// if it did not exist.
    async fn resolve_payment(
        &self,
        user_id: &str,
        payment_id: &str,
        order_id: &str,
    ) -> Result<Payment, VerificationError> {
        let payment = match self.db.fetch_payment_by_provider_payment_id(payment_id).await? {
            Some(p) => Some(p),
            None => self.db.fetch_payment_by_provider_order_id(order_id).await?,
        };
        match payment {
            Some(p) if p.user_id == user_id => Ok(p),
            Some(p) => {
                warn!("🔄️🔍️ {user_id} tried to verify payment #{}, which belongs to {}", p.id, p.user_id);
                Err(VerificationError::PaymentNotFound(order_id.to_string()))
            },
            None => Err(VerificationError::PaymentNotFound(order_id.to_string())),
        }
    }

    async fn commit(
        &self,
        request: &VerificationRequest,
        payment: Payment,
        provider_payment: ProviderPayment,
        attempt: &mut Attempt,
    ) -> Result<VerificationOutcome, VerificationError> {
        let payment_id = provider_payment.id.as_str();
        match payment.status {
            PaymentStatus::Completed if payment.provider_payment_id.as_deref() == Some(payment_id) => {
                return self.replay(payment, attempt).await;
            },
            PaymentStatus::Completed | PaymentStatus::Cancelled => {
                return Err(VerificationError::OrderAlreadySettled(attempt.txnid.clone()));
            },
            _ => {},
        }
        let settlement = Settlement {
            provider_payment_id: payment_id.to_string(),
            provider_signature: request.signature().map(String::from),
            verification: VerificationMetadata {
                provider_status: provider_payment.status.clone(),
                provider_amount: provider_payment.amount,
                provider_currency: provider_payment.currency.clone(),
                method: provider_payment.method.clone(),
                credits_granted: request.credits,
                verified_at: Utc::now(),
            },
        };
        let grant = CreditGrant {
            user_id: attempt.user_id.clone(),
            credits: request.credits,
            subscription: request.subscription.clone().filter(|s| !s.trim().is_empty()),
        };
        match self.db.settle_payment(payment.id, settlement, grant).await {
            Ok(Some(settled)) => {
                attempt.payment = Some(settled.payment.clone());
                self.write_log(&attempt.txnid, AuditStatus::Completed, settled.payment.amount).await;
                info!(
                    "🔄️✅️ Payment #{} ({payment_id}) verified. {} credits added to {}",
                    settled.payment.id, request.credits, attempt.user_id
                );
                let event = PaymentCompletedEvent {
                    payment: settled.payment.clone(),
                    recipient: self.recipient(&attempt.user_id).await,
                    credits_added: request.credits,
                    total_credits: settled.total_credits,
                };
                self.producers.publish_payment_completed(event).await;
                Ok(VerificationOutcome {
                    credits_added: request.credits,
                    total_credits: settled.total_credits,
                    payment: settled.payment,
                    replayed: false,
                })
            },
            Ok(None) => {
                debug!("🔄️🔍️ Payment #{} changed state while it was being verified", payment.id);
                let current = self
                    .db
                    .fetch_payment(payment.id)
                    .await?
                    .ok_or(LedgerError::PaymentNotFound(payment.id))?;
                attempt.payment = Some(current.clone());
                if current.status == PaymentStatus::Completed && current.provider_payment_id.as_deref() == Some(payment_id)
                {
                    self.replay(current, attempt).await
                } else {
                    Err(VerificationError::OrderAlreadySettled(attempt.txnid.clone()))
                }
            },
            Err(LedgerError::PaymentAlreadyExists(msg)) => {
                warn!("🔄️🔍️ Provider payment {payment_id} has already been applied to another order. {msg}");
                Err(VerificationError::OrderAlreadySettled(attempt.txnid.clone()))
            },
            Err(e) => Err(e.into()),
        }
    }

    /// Reports an earlier settlement of the same provider payment without granting anything.
    async fn replay(&self, payment: Payment, attempt: &mut Attempt) -> Result<VerificationOutcome, VerificationError> {
        let total_credits = self.db.fetch_user_account(&attempt.user_id).await?.map(|u| u.credit_point).unwrap_or(0);
        self.write_log(&attempt.txnid, AuditStatus::Completed, payment.amount).await;
        info!("🔄️♻️ Payment #{} was already settled. Returning the earlier result.", payment.id);
        attempt.payment = Some(payment.clone());
        Ok(VerificationOutcome { credits_added: payment.credits_granted(), total_credits, payment, replayed: true })
    }

    /// The single exit path for failed verifications. Writes the terminal audit log entry and, depending on the
    /// error, moves the payment to `failed`. Nothing in here can mask the original error.
    async fn handle_failure(&self, attempt: &mut Attempt, error: &VerificationError) {
        if attempt.payment.is_none() {
            attempt.payment = self.find_payment_for_failure(attempt, error).await;
        }
        let fails_payment = matches!(
            error,
            VerificationError::PaymentIdMissing |
                VerificationError::InvalidSignature |
                VerificationError::AmountMismatch { .. } |
                VerificationError::PaymentNotCaptured(_) |
                VerificationError::OrderMismatch { .. } |
                VerificationError::InternalError(_)
        );
        let log_status = match error {
            VerificationError::InternalError(_) => AuditStatus::Incomplete,
            _ => AuditStatus::Failed,
        };
        if let Some(payment) = attempt.payment.clone() {
            if fails_payment {
                match self.db.fail_payment(payment.id).await {
                    Ok(Some(failed)) => {
                        self.notify_failure(failed.clone(), error).await;
                        attempt.payment = Some(failed);
                    },
                    Ok(None) => trace!("🔄️❌️ Payment #{} is {} and was left as is", payment.id, payment.status),
                    Err(e) => error!("🔄️❌️ Could not mark payment #{} as failed. {e}", payment.id),
                }
            }
        }
        // The log never contradicts a settled payment, whoever owns it
        if let Some(settled) = self.settled_payment_for_log(attempt).await {
            self.write_log(&attempt.txnid, AuditStatus::from(settled.status), settled.amount).await;
            return;
        }
        self.write_log(&attempt.txnid, log_status, attempt.best_amount()).await;
    }

    /// The completed or cancelled payment behind the attempt's log entry, if there is one. Unlike
    /// [`Self::find_payment_for_failure`], this does not check ownership: the log row is keyed by the order id alone.
    async fn settled_payment_for_log(&self, attempt: &Attempt) -> Option<Payment> {
        if let Some(payment) = attempt.payment.as_ref().filter(|p| p.status.is_terminal()) {
            return Some(payment.clone());
        }
        let order_id = attempt.order_id.as_deref()?;
        match self.db.fetch_payment_by_provider_order_id(order_id).await {
            Ok(payment) => payment.filter(|p| p.status.is_terminal()),
            Err(e) => {
                error!("🔄️❌️ Could not look up order {order_id} for [{}]. {e}", attempt.txnid);
                None
            },
        }
    }

    /// Looks up the payment that a failed attempt refers to, so that it can be marked as failed. Lookup errors are
    /// logged and otherwise ignored.
    async fn find_payment_for_failure(&self, attempt: &Attempt, error: &VerificationError) -> Option<Payment> {
        if matches!(error, VerificationError::PaymentNotFound(_)) {
            return None;
        }
        let result = match attempt.order_id.as_deref() {
            Some(order_id) => self.db.fetch_payment_by_provider_order_id(order_id).await,
            // Without an order id, the only candidate is the user's latest checkout, and only while it is in flight
            None => self.db.fetch_latest_payment_for_user(&attempt.user_id).await.map(|p| {
                p.filter(|p| PaymentStatus::FAILABLE.contains(&p.status))
            }),
        };
        match result {
            Ok(payment) => payment.filter(|p| p.user_id == attempt.user_id),
            Err(e) => {
                error!("🔄️❌️ Could not look up the payment for [{}]. {e}", attempt.txnid);
                None
            },
        }
    }

    async fn notify_failure(&self, payment: Payment, error: &VerificationError) {
        let recipient = self.recipient(&payment.user_id).await;
        let event = PaymentFailedEvent { payment, recipient, reason: error.reason().to_string() };
        self.producers.publish_payment_failed(event).await;
    }

    async fn recipient(&self, user_id: &str) -> Option<Recipient> {
        match self.db.fetch_user_account(user_id).await {
            Ok(user) => user.as_ref().map(Recipient::from),
            Err(e) => {
                warn!("🔄️ Could not fetch the account for {user_id}. No notification will be sent. {e}");
                None
            },
        }
    }

    /// Best-effort audit log write. Failures are logged and swallowed.
    async fn write_log(&self, txnid: &str, status: AuditStatus, amount: MinorUnits) {
        if let Err(e) = self.db.upsert_log(NewAuditLogEntry::new(txnid, status, amount)).await {
            error!("🔄️ Could not write audit log entry [{txnid}] -> {status}. {e}");
        }
    }
}
