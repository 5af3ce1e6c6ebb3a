#![allow(dead_code)]
use std::time::Duration;

use credit_payment_engine::{
    checkout_objects::{CreatedOrder, NewOrderRequest},
    db_types::{MinorUnits, NewUserAccount},
    events::EventProducers,
    helpers::SignedFields,
    test_utils::{
        prepare_env::{drop_database, prepare_test_env, random_db_path},
        FakeProvider,
    },
    verification_objects::{ReconciliationConfig, VerificationRequest},
    BalanceLedger,
    CheckoutApi,
    ReconciliationApi,
    SqliteDatabase,
};

pub const KEY_SECRET: &str = "rzp_test_secret_7hQ2";

pub struct TestContext {
    pub url: String,
    pub db: SqliteDatabase,
    pub provider: FakeProvider,
    pub checkout: CheckoutApi<SqliteDatabase, FakeProvider>,
    pub reconciler: ReconciliationApi<SqliteDatabase, FakeProvider>,
}

pub async fn setup() -> TestContext {
    setup_with(EventProducers::default(), default_config()).await
}

pub fn default_config() -> ReconciliationConfig {
    ReconciliationConfig::new(KEY_SECRET).with_gateway_timeout(Duration::from_secs(2))
}

/// A fresh database with two users: alice (no credits) and bob (10 credits).
pub async fn setup_with(producers: EventProducers, config: ReconciliationConfig) -> TestContext {
    let url = random_db_path();
    prepare_test_env(&url).await;
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database");
    db.create_user_account(NewUserAccount::new("alice", "alice@example.com", "Alice")).await.expect("Error adding alice");
    db.create_user_account(NewUserAccount::new("bob", "bob@example.com", "Bob").with_credits(10))
        .await
        .expect("Error adding bob");
    let provider = FakeProvider::new();
    let checkout = CheckoutApi::new(db.clone(), provider.clone());
    let reconciler = ReconciliationApi::new(db.clone(), provider.clone(), producers, config);
    TestContext { url, db, provider, checkout, reconciler }
}

impl TestContext {
    pub async fn create_order(&self, user: &str, amount: i64) -> CreatedOrder {
        let request = NewOrderRequest::new(MinorUnits::from(amount), format!("receipt_{user}_{amount}"));
        self.checkout.create_order(user, request).await.expect("Error creating order")
    }

    /// Creates an order and has the fake provider report `payment_id` as captured against it for `paid` minor units.
    pub async fn paid_order(&self, user: &str, amount: i64, paid: i64, payment_id: &str) -> CreatedOrder {
        let order = self.create_order(user, amount).await;
        self.provider.add_captured_payment(payment_id, &order.order_id, MinorUnits::from(paid));
        order
    }

    pub async fn balance(&self, user: &str) -> i64 {
        self.db.fetch_user_account(user).await.expect("Error fetching user").map(|u| u.credit_point).unwrap_or(-1)
    }

    pub async fn tear_down(mut self) {
        self.db.close().await;
        drop_database(&self.url).await;
    }
}

pub fn sign(order_id: &str, payment_id: &str) -> String {
    SignedFields::Razorpay { order_id, payment_id }.digest(KEY_SECRET)
}

/// A fully signed verification request
pub fn signed_request(order_id: &str, payment_id: &str, credits: i64) -> VerificationRequest {
    VerificationRequest::new(order_id, payment_id, credits).with_signature(sign(order_id, payment_id))
}
