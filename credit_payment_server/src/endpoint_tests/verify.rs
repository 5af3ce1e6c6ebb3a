use actix_web::{http::StatusCode, test, test::TestRequest, web, App};
use credit_payment_engine::{
    db_types::PaymentStatus,
    events::EventProducers,
    traits::PaymentProviderError,
    verification_objects::ReconciliationConfig,
    BalanceLedger,
    OrderLedger,
    ReconciliationApi,
    SqliteDatabase,
};
use serde_json::{json, Value};

use super::{
    helpers::{bearer, call, issue_token, send, sign, test_db, validator, KEY_SECRET},
    mocks::{captured_payment, mock_gateway, MockGateway},
};
use crate::{auth::Role, middleware::JwtMiddlewareFactory, routes::VerifyPaymentRoute};

const ORDER_ID: &str = "order_9A33XWu170gUtm";
const PAYMENT_ID: &str = "pay_29QQoUBi66xm2f";

fn reconciler(db: SqliteDatabase, gateway: MockGateway) -> ReconciliationApi<SqliteDatabase, MockGateway> {
    ReconciliationApi::new(db, gateway, EventProducers::default(), ReconciliationConfig::new(KEY_SECRET))
}

fn configure(api: ReconciliationApi<SqliteDatabase, MockGateway>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(api)).service(
            web::scope("/api")
                .wrap(JwtMiddlewareFactory::new(validator()))
                .service(VerifyPaymentRoute::<SqliteDatabase, MockGateway>::new()),
        );
    }
}

fn verify_request(token: &str, body: Value) -> TestRequest {
    TestRequest::post().uri("/api/verify-payment").insert_header(bearer(token)).set_json(body)
}

fn signed_body(amount: i64, credits: i64) -> Value {
    json!({
        "razorpay_order_id": ORDER_ID,
        "razorpay_payment_id": PAYMENT_ID,
        "razorpay_signature": sign(ORDER_ID, PAYMENT_ID),
        "amount": amount,
        "credits": credits,
        "subscription": "Pro"
    })
}

#[actix_web::test]
async fn verify_payment_and_repeat() {
    let _ = env_logger::try_init();
    let store = test_db().await;
    store.add_order("alice", ORDER_ID, 50_000).await;
    let mut gateway = mock_gateway();
    gateway
        .expect_fetch_payment()
        .withf(|id| id == PAYMENT_ID)
        .times(2)
        .returning(|id| Ok(captured_payment(id, ORDER_ID, 50_000)));
    let api = reconciler(store.db.clone(), gateway);
    let app = test::init_service(App::new().configure(configure(api))).await;
    let token = issue_token("alice", vec![Role::User]);

    let (status, body) = call(&app, verify_request(&token, signed_body(50_000, 500)).to_request()).await;
    assert_eq!(status, StatusCode::OK, "was: {body}");
    let result: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(result, json!({"status": "success", "credits_added": 500, "total_credits": 500}));

    // The same checkout result again grants nothing more
    let (status, body) = call(&app, verify_request(&token, signed_body(50_000, 500)).to_request()).await;
    assert_eq!(status, StatusCode::OK, "was: {body}");
    let result: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(result, json!({"status": "success", "credits_added": 500, "total_credits": 500}));

    let user = store.db.fetch_user_account("alice").await.unwrap().unwrap();
    assert_eq!(user.credit_point, 500);
    assert_eq!(user.subscription.as_deref(), Some("Pro"));
    let payment = store.db.fetch_payment_by_provider_order_id(ORDER_ID).await.unwrap().unwrap();
    assert_eq!(payment.status, PaymentStatus::Completed);
    assert_eq!(payment.provider_payment_id.as_deref(), Some(PAYMENT_ID));
    store.tear_down().await;
}

#[actix_web::test]
async fn verify_payment_with_tampered_signature() {
    let _ = env_logger::try_init();
    let store = test_db().await;
    store.add_order("alice", ORDER_ID, 50_000).await;
    let mut gateway = mock_gateway();
    gateway.expect_fetch_payment().returning(|id| Ok(captured_payment(id, ORDER_ID, 50_000)));
    let api = reconciler(store.db.clone(), gateway);
    let token = issue_token("alice", vec![Role::User]);
    let mut body = signed_body(50_000, 500);
    body["razorpay_signature"] = json!(sign(ORDER_ID, "pay_SomeoneElse"));
    let (status, body) = send(verify_request(&token, body), configure(api)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let result: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(result["status"], "failed");
    assert_eq!(result["reason"], "invalid_signature");
    assert_eq!(store.db.fetch_user_account("alice").await.unwrap().unwrap().credit_point, 0);
    store.tear_down().await;
}

#[actix_web::test]
async fn verify_payment_without_payment_id() {
    let _ = env_logger::try_init();
    let store = test_db().await;
    store.add_order("alice", ORDER_ID, 50_000).await;
    let mut gateway = mock_gateway();
    gateway.expect_fetch_payment().never();
    let api = reconciler(store.db.clone(), gateway);
    let token = issue_token("alice", vec![Role::User]);
    let body = json!({"razorpay_order_id": ORDER_ID, "amount": 50000, "credits": 500});
    let (status, body) = send(verify_request(&token, body), configure(api)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let result: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(result["reason"], "payment_id_missing");
    let payment = store.db.fetch_payment_by_provider_order_id(ORDER_ID).await.unwrap().unwrap();
    assert_eq!(payment.status, PaymentStatus::Failed);
    store.tear_down().await;
}

#[actix_web::test]
async fn verify_payment_with_amount_mismatch() {
    let _ = env_logger::try_init();
    let store = test_db().await;
    store.add_order("alice", ORDER_ID, 50_000).await;
    let mut gateway = mock_gateway();
    gateway.expect_fetch_payment().returning(|id| Ok(captured_payment(id, ORDER_ID, 49_900)));
    let api = reconciler(store.db.clone(), gateway);
    let token = issue_token("alice", vec![Role::User]);
    let (status, body) = send(verify_request(&token, signed_body(50_000, 500)), configure(api)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let result: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(result["reason"], "amount_mismatch");
    assert_eq!(store.db.fetch_user_account("alice").await.unwrap().unwrap().credit_point, 0);
    store.tear_down().await;
}

#[actix_web::test]
async fn verify_payment_when_gateway_is_down() {
    let _ = env_logger::try_init();
    let store = test_db().await;
    store.add_order("alice", ORDER_ID, 50_000).await;
    let mut gateway = mock_gateway();
    gateway.expect_fetch_payment().returning(|_| Err(PaymentProviderError::Timeout));
    let api = reconciler(store.db.clone(), gateway);
    let token = issue_token("alice", vec![Role::User]);
    let (status, body) = send(verify_request(&token, signed_body(50_000, 500)), configure(api)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let result: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(result["reason"], "gateway_unavailable");
    // A gateway failure is retryable, so the payment is left as it was
    let payment = store.db.fetch_payment_by_provider_order_id(ORDER_ID).await.unwrap().unwrap();
    assert_eq!(payment.status, PaymentStatus::Created);
    store.tear_down().await;
}

#[actix_web::test]
async fn verify_payment_for_unknown_order() {
    let _ = env_logger::try_init();
    let store = test_db().await;
    let mut gateway = mock_gateway();
    gateway.expect_fetch_payment().returning(|id| Ok(captured_payment(id, ORDER_ID, 50_000)));
    let api = reconciler(store.db.clone(), gateway);
    let token = issue_token("alice", vec![Role::User]);
    let (status, body) = send(verify_request(&token, signed_body(50_000, 500)), configure(api)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let result: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(result["reason"], "payment_not_found");
    store.tear_down().await;
}
