//! Order creation: the first half of a checkout.
use std::{fmt::Debug, time::Duration};

use log::*;

use crate::{
    cpe_api::{
        checkout_objects::{CreatedOrder, NewOrderRequest},
        errors::CheckoutError,
        verification_objects::DEFAULT_GATEWAY_TIMEOUT,
    },
    db_types::NewPayment,
    helpers::new_internal_order_id,
    traits::{CheckoutDatabase, PaymentProvider, PaymentProviderError, ProviderOrderRequest},
};

/// `CheckoutApi` creates orders with the payment provider and records them in the order ledger.
pub struct CheckoutApi<B, P> {
    db: B,
    provider: P,
    gateway_timeout: Duration,
}

impl<B, P> Debug for CheckoutApi<B, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CheckoutApi")
    }
}

impl<B, P> CheckoutApi<B, P> {
    pub fn new(db: B, provider: P) -> Self {
        Self { db, provider, gateway_timeout: DEFAULT_GATEWAY_TIMEOUT }
    }

    pub fn with_gateway_timeout(mut self, timeout: Duration) -> Self {
        self.gateway_timeout = timeout;
        self
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B, P> CheckoutApi<B, P>
where
    B: CheckoutDatabase,
    P: PaymentProvider,
{
    /// Creates an order with the payment provider on behalf of `user_id`, and stores a matching payment record with
    /// status `created`.
    ///
    /// Nothing is stored if the provider call fails. If the provider call succeeds but the payment cannot be stored,
    /// the provider order is simply never paid for.
    pub async fn create_order(&self, user_id: &str, request: NewOrderRequest) -> Result<CreatedOrder, CheckoutError> {
        if !request.amount.is_positive() {
            return Err(CheckoutError::InvalidRequest("Amount must be greater than zero".into()));
        }
        if request.receipt.trim().is_empty() {
            return Err(CheckoutError::InvalidRequest("A receipt is required".into()));
        }
        if request.currency.trim().is_empty() {
            return Err(CheckoutError::InvalidRequest("Currency cannot be empty".into()));
        }
        if self.db.fetch_user_account(user_id).await?.is_none() {
            return Err(CheckoutError::UserNotFound(user_id.to_string()));
        }
        let provider_request = ProviderOrderRequest {
            amount: request.amount,
            currency: request.currency.clone(),
            receipt: request.receipt.clone(),
            notes: request.notes.to_map(),
        };
        let order = tokio::time::timeout(self.gateway_timeout, self.provider.create_order(provider_request))
            .await
            .map_err(|_| PaymentProviderError::Timeout)??;
        debug!("🔄️🧾️ {} order {} created for {user_id}", self.provider.name(), order.provider_order_id);
        let order_id = new_internal_order_id(user_id);
        let new_payment = NewPayment::new(order_id, user_id.to_string(), request.amount, request.receipt)
            .with_currency(request.currency)
            .with_notes(request.notes)
            .with_provider(self.provider.name())
            .with_provider_order_id(order.provider_order_id.clone());
        let payment = self.db.insert_payment(new_payment).await.map_err(|e| {
            error!(
                "🔄️🧾️ Provider order {} was created, but the payment record could not be saved. {e}",
                order.provider_order_id
            );
            e
        })?;
        info!(
            "🔄️🧾️ Order {} ({}) recorded for {user_id}: {} {}",
            payment.order_id, order.provider_order_id, payment.amount, payment.currency
        );
        Ok(CreatedOrder {
            order_id: order.provider_order_id,
            amount: payment.amount,
            currency: payment.currency.clone(),
            key_id: self.provider.public_key().to_string(),
            payment,
        })
    }
}
