use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use credit_payment_engine::{
    db_types::{MinorUnits, PaymentStatus},
    traits::{PaymentProviderError, ProviderOrder, ProviderOrderRequest},
    CheckoutApi,
    OrderLedger,
    SqliteDatabase,
};
use serde_json::json;

use super::{
    helpers::{bearer, issue_token, send, test_db, validator},
    mocks::{mock_gateway, MockGateway, MOCK_KEY_ID},
};
use crate::{auth::Role, data_objects::CreateOrderResponse, middleware::JwtMiddlewareFactory, routes::CreateOrderRoute};

fn configure(api: CheckoutApi<SqliteDatabase, MockGateway>) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(api)).service(
            web::scope("/api")
                .wrap(JwtMiddlewareFactory::new(validator()))
                .service(CreateOrderRoute::<SqliteDatabase, MockGateway>::new()),
        );
    }
}

fn provider_order(
    order_id: &'static str,
) -> impl Fn(ProviderOrderRequest) -> Result<ProviderOrder, PaymentProviderError> + Send + 'static {
    move |req| {
        Ok(ProviderOrder {
            provider_order_id: order_id.to_string(),
            amount: req.amount,
            currency: req.currency,
            receipt: Some(req.receipt),
            status: "created".to_string(),
        })
    }
}

#[actix_web::test]
async fn create_order_without_a_token() {
    let _ = env_logger::try_init();
    let store = test_db().await;
    let mut gateway = mock_gateway();
    gateway.expect_create_order().never();
    let api = CheckoutApi::new(store.db.clone(), gateway);
    let req = TestRequest::post().uri("/api/create-order").set_json(json!({"amount": 50000, "receipt": "r_1"}));
    let (status, body) = send(req, configure(api)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("No access token was provided"), "was: {body}");
    store.tear_down().await;
}

#[actix_web::test]
async fn create_order() {
    let _ = env_logger::try_init();
    let store = test_db().await;
    let mut gateway = mock_gateway();
    gateway
        .expect_create_order()
        .withf(|o| {
            o.amount == MinorUnits::from(50_000)
                && o.currency == "INR"
                && o.receipt == "receipt_001"
                && o.notes.get("tierName") == Some(&json!("Pro"))
        })
        .times(1)
        .returning(provider_order("order_9A33XWu170gUtm"));
    let api = CheckoutApi::new(store.db.clone(), gateway);
    let token = issue_token("alice", vec![Role::User]);
    let req = TestRequest::post().uri("/api/create-order").insert_header(bearer(&token)).set_json(json!({
        "amount": 50000,
        "receipt": "receipt_001",
        "notes": {"tierName": "Pro", "credits": 500}
    }));
    let (status, body) = send(req, configure(api)).await;
    assert_eq!(status, StatusCode::OK, "was: {body}");
    let order: CreateOrderResponse = serde_json::from_str(&body).unwrap();
    assert_eq!(order.order_id, "order_9A33XWu170gUtm");
    assert_eq!(order.amount, MinorUnits::from(50_000));
    assert_eq!(order.currency, "INR");
    assert_eq!(order.key_id, MOCK_KEY_ID);

    let payment = store
        .db
        .fetch_payment_by_provider_order_id("order_9A33XWu170gUtm")
        .await
        .unwrap()
        .expect("Payment was not stored");
    assert_eq!(payment.user_id, "alice");
    assert_eq!(payment.status, PaymentStatus::Created);
    assert_eq!(payment.provider, "razorpay");
    assert_eq!(payment.notes.tier_name.as_deref(), Some("Pro"));
    assert_eq!(payment.notes.credits, Some(500));
    store.tear_down().await;
}

#[actix_web::test]
async fn create_order_with_zero_amount() {
    let _ = env_logger::try_init();
    let store = test_db().await;
    let mut gateway = mock_gateway();
    gateway.expect_create_order().never();
    let api = CheckoutApi::new(store.db.clone(), gateway);
    let token = issue_token("alice", vec![Role::User]);
    let req = TestRequest::post()
        .uri("/api/create-order")
        .insert_header(bearer(&token))
        .set_json(json!({"amount": 0, "receipt": "r_1"}));
    let (status, body) = send(req, configure(api)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Amount must be greater than zero"), "was: {body}");
    store.tear_down().await;
}

#[actix_web::test]
async fn create_order_for_unknown_user() {
    let _ = env_logger::try_init();
    let store = test_db().await;
    let mut gateway = mock_gateway();
    gateway.expect_create_order().never();
    let api = CheckoutApi::new(store.db.clone(), gateway);
    let token = issue_token("mallory", vec![Role::User]);
    let req = TestRequest::post()
        .uri("/api/create-order")
        .insert_header(bearer(&token))
        .set_json(json!({"amount": 1000, "receipt": "r_1"}));
    let (status, _) = send(req, configure(api)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    store.tear_down().await;
}

#[actix_web::test]
async fn create_order_when_gateway_is_down() {
    let _ = env_logger::try_init();
    let store = test_db().await;
    let mut gateway = mock_gateway();
    gateway
        .expect_create_order()
        .times(1)
        .returning(|_| Err(PaymentProviderError::Network("connection refused".into())));
    let api = CheckoutApi::new(store.db.clone(), gateway);
    let token = issue_token("alice", vec![Role::User]);
    let req = TestRequest::post()
        .uri("/api/create-order")
        .insert_header(bearer(&token))
        .set_json(json!({"amount": 1000, "receipt": "r_1"}));
    let (status, body) = send(req, configure(api)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body.contains("error"), "was: {body}");
    assert!(store.db.fetch_payments_for_user("alice").await.unwrap().is_empty());
    store.tear_down().await;
}
