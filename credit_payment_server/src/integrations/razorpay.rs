//! Adapts the Razorpay REST client to the engine's [`PaymentProvider`] interface.
use credit_payment_engine::{
    db_types::MinorUnits,
    traits::{PaymentProvider, PaymentProviderError, ProviderOrder, ProviderOrderRequest, ProviderPayment},
};
use log::*;
use razorpay_tools::{NewRazorpayOrder, RazorpayApi, RazorpayApiError, RazorpayOrder, RazorpayPayment};

pub const RAZORPAY_PROVIDER_NAME: &str = "razorpay";

#[derive(Clone)]
pub struct RazorpayGateway {
    api: RazorpayApi,
}

impl RazorpayGateway {
    pub fn new(api: RazorpayApi) -> Self {
        Self { api }
    }
}

impl PaymentProvider for RazorpayGateway {
    fn name(&self) -> &str {
        RAZORPAY_PROVIDER_NAME
    }

    fn public_key(&self) -> &str {
        self.api.key_id()
    }

    async fn create_order(&self, order: ProviderOrderRequest) -> Result<ProviderOrder, PaymentProviderError> {
        let request = NewRazorpayOrder::new(order.amount.value(), &order.currency, &order.receipt).with_notes(order.notes);
        let order = self.api.create_order(request).await.map_err(|e| {
            warn!("💳️ Razorpay could not create an order. {e}");
            provider_error(e)
        })?;
        trace!("💳️ Razorpay order {} created", order.id);
        Ok(provider_order(order))
    }

    async fn fetch_payment(&self, payment_id: &str) -> Result<ProviderPayment, PaymentProviderError> {
        let payment = self.api.fetch_payment(payment_id).await.map_err(|e| {
            warn!("💳️ Could not fetch payment {payment_id} from Razorpay. {e}");
            provider_error(e)
        })?;
        trace!("💳️ Razorpay reports payment {} as {}", payment.id, payment.status);
        Ok(provider_payment(payment))
    }
}

fn provider_order(order: RazorpayOrder) -> ProviderOrder {
    ProviderOrder {
        provider_order_id: order.id,
        amount: MinorUnits::from(order.amount),
        currency: order.currency,
        receipt: order.receipt,
        status: order.status,
    }
}

fn provider_payment(payment: RazorpayPayment) -> ProviderPayment {
    ProviderPayment {
        id: payment.id,
        amount: MinorUnits::from(payment.amount),
        status: payment.status,
        order_id: payment.order_id,
        currency: payment.currency,
        method: payment.method,
        email: payment.email,
    }
}

/// Raw provider responses are summarised, never passed on verbatim.
fn provider_error(e: RazorpayApiError) -> PaymentProviderError {
    match e {
        RazorpayApiError::Initialization(s) => PaymentProviderError::Network(s),
        RazorpayApiError::RequestError(s) => PaymentProviderError::Network(s),
        RazorpayApiError::Timeout => PaymentProviderError::Timeout,
        RazorpayApiError::NotFound(s) => PaymentProviderError::NotFound(s),
        RazorpayApiError::RateLimited => PaymentProviderError::RateLimited,
        RazorpayApiError::JsonError(s) => PaymentProviderError::InvalidResponse(s),
        RazorpayApiError::QueryError { status, .. } if status >= 500 => {
            PaymentProviderError::Network(format!("Razorpay returned status {status}"))
        },
        RazorpayApiError::QueryError { status, message } => {
            PaymentProviderError::Rejected(format!("Razorpay returned status {status}. {message}"))
        },
    }
}
