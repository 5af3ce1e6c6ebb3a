use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use log::*;

use crate::{
    db_types::MinorUnits,
    traits::{PaymentProvider, PaymentProviderError, ProviderOrder, ProviderOrderRequest, ProviderPayment},
};

pub const FAKE_KEY_ID: &str = "rzp_test_fake_key";

#[derive(Debug, Default)]
struct FakeProviderState {
    order_count: u64,
    orders: Vec<ProviderOrderRequest>,
    payments: HashMap<String, ProviderPayment>,
    fetch_count: u64,
    delay: Option<Duration>,
    failure: Option<PaymentProviderError>,
}

/// An in-memory payment provider. Clones share state, so a test can keep a handle to it after handing a clone to an
/// API.
#[derive(Debug, Clone, Default)]
pub struct FakeProvider {
    state: Arc<Mutex<FakeProviderState>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a payment that `fetch_payment` will report.
    pub fn add_payment(&self, payment: ProviderPayment) {
        self.state.lock().expect("poisoned").payments.insert(payment.id.clone(), payment);
    }

    /// Registers a captured payment against `order_id`.
    pub fn add_captured_payment(&self, payment_id: &str, order_id: &str, amount: MinorUnits) {
        self.add_payment(ProviderPayment {
            id: payment_id.to_string(),
            amount,
            status: "captured".into(),
            order_id: Some(order_id.to_string()),
            currency: "INR".into(),
            method: Some("upi".into()),
            email: None,
        });
    }

    /// Every call waits this long before answering.
    pub fn set_delay(&self, delay: Duration) {
        self.state.lock().expect("poisoned").delay = Some(delay);
    }

    /// Every call fails with `error` until this is called again with `None`.
    pub fn fail_with(&self, error: Option<PaymentProviderError>) {
        self.state.lock().expect("poisoned").failure = error;
    }

    pub fn fetch_count(&self) -> u64 {
        self.state.lock().expect("poisoned").fetch_count
    }

    pub fn orders(&self) -> Vec<ProviderOrderRequest> {
        self.state.lock().expect("poisoned").orders.clone()
    }

    fn prepare_call(&self) -> (Option<Duration>, Option<PaymentProviderError>) {
        let state = self.state.lock().expect("poisoned");
        (state.delay, state.failure.clone())
    }
}

impl PaymentProvider for FakeProvider {
    fn name(&self) -> &str {
        "razorpay"
    }

    fn public_key(&self) -> &str {
        FAKE_KEY_ID
    }

    async fn create_order(&self, order: ProviderOrderRequest) -> Result<ProviderOrder, PaymentProviderError> {
        let (delay, failure) = self.prepare_call();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(e) = failure {
            return Err(e);
        }
        let mut state = self.state.lock().expect("poisoned");
        state.order_count += 1;
        let provider_order_id = format!("order_FAKE{:010}", state.order_count);
        trace!("💳️ Fake order {provider_order_id} created for {}", order.amount);
        let result = ProviderOrder {
            provider_order_id,
            amount: order.amount,
            currency: order.currency.clone(),
            receipt: Some(order.receipt.clone()),
            status: "created".into(),
        };
        state.orders.push(order);
        Ok(result)
    }

    async fn fetch_payment(&self, payment_id: &str) -> Result<ProviderPayment, PaymentProviderError> {
        let (delay, failure) = self.prepare_call();
        self.state.lock().expect("poisoned").fetch_count += 1;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(e) = failure {
            return Err(e);
        }
        self.state
            .lock()
            .expect("poisoned")
            .payments
            .get(payment_id)
            .cloned()
            .ok_or_else(|| PaymentProviderError::NotFound(payment_id.to_string()))
    }
}
