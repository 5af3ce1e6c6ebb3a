use credit_payment_engine::{
    db_types::MinorUnits,
    traits::{PaymentProvider, PaymentProviderError, ProviderOrder, ProviderOrderRequest, ProviderPayment},
};
use mockall::mock;

pub const MOCK_KEY_ID: &str = "rzp_test_mock_key";

mock! {
    pub Gateway {}
    impl PaymentProvider for Gateway {
        fn name(&self) -> &str;
        fn public_key(&self) -> &str;
        async fn create_order(&self, order: ProviderOrderRequest) -> Result<ProviderOrder, PaymentProviderError>;
        async fn fetch_payment(&self, payment_id: &str) -> Result<ProviderPayment, PaymentProviderError>;
    }
}

/// A gateway mock with the identity expectations filled in. Order and payment expectations are up to the test.
pub fn mock_gateway() -> MockGateway {
    let mut gateway = MockGateway::new();
    gateway.expect_name().return_const("razorpay".to_string());
    gateway.expect_public_key().return_const(MOCK_KEY_ID.to_string());
    gateway
}

pub fn captured_payment(payment_id: &str, order_id: &str, amount: i64) -> ProviderPayment {
    ProviderPayment {
        id: payment_id.to_string(),
        amount: MinorUnits::from(amount),
        status: "captured".to_string(),
        order_id: Some(order_id.to_string()),
        currency: "INR".to_string(),
        method: Some("upi".to_string()),
        email: None,
    }
}
