use actix_web::{
    body::{to_bytes, MessageBody},
    dev::{Service, ServiceResponse},
    http::StatusCode,
    test,
    test::TestRequest,
    web::ServiceConfig,
    App,
    ResponseError,
};
use chrono::{Days, Utc};
use credit_payment_engine::{
    db_types::{MinorUnits, NewPayment, NewUserAccount, Payment},
    helpers::SignedFields,
    test_utils::prepare_env::{drop_database, prepare_test_env, random_db_path},
    BalanceLedger,
    OrderLedger,
    SqliteDatabase,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use log::debug;

use crate::{
    auth::{JwtClaims, Role, TokenValidator},
    config::AuthConfig,
};

// DO NOT re-use these secrets anywhere.
pub const JWT_SECRET: &str = "endpoint-test-jwt-secret-9f3a";
pub const KEY_SECRET: &str = "rzp_test_endpoint_secret";

pub fn validator() -> TokenValidator {
    TokenValidator::new(&AuthConfig::new(JWT_SECRET))
}

pub fn issue_token(sub: &str, roles: Vec<Role>) -> String {
    let claims = JwtClaims {
        sub: sub.to_string(),
        email: None,
        roles,
        exp: (Utc::now() + Days::new(1)).timestamp() as usize,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(JWT_SECRET.as_bytes())).expect("Failed to sign token")
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

pub fn sign(order_id: &str, payment_id: &str) -> String {
    SignedFields::Razorpay { order_id, payment_id }.digest(KEY_SECRET)
}

/// Builds an app from `configure`, sends `req` to it, and returns the status and body. Errors raised by middleware
/// are rendered the way the server would render them.
pub async fn send<F>(req: TestRequest, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    let app = test::init_service(App::new().configure(configure)).await;
    call(&app, req.to_request()).await
}

/// Sends a request to an app that is already running. Use this when a test makes several requests in turn.
pub async fn call<S, R, B>(app: &S, req: R) -> (StatusCode, String)
where
    S: Service<R, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    match test::try_call_service(app, req).await {
        Ok(res) => {
            let status = res.status();
            let body = test::read_body(res).await;
            (status, String::from_utf8_lossy(&body).into_owned())
        },
        Err(e) => {
            debug!("Request was rejected by middleware. {e}");
            let res = e.as_response_error().error_response();
            let status = res.status();
            let body = to_bytes(res.into_body()).await.expect("Could not read error body");
            (status, String::from_utf8_lossy(&body).into_owned())
        },
    }
}

pub struct TestDb {
    pub url: String,
    pub db: SqliteDatabase,
}

/// A fresh database with one user, alice, who has no credits.
pub async fn test_db() -> TestDb {
    let url = random_db_path();
    prepare_test_env(&url).await;
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database");
    db.create_user_account(NewUserAccount::new("alice", "alice@example.com", "Alice")).await.expect("Error adding alice");
    TestDb { url, db }
}

impl TestDb {
    /// Records a payment for `user_id` as if checkout had created provider order `order_id`.
    pub async fn add_order(&self, user_id: &str, order_id: &str, amount: i64) -> Payment {
        let payment = NewPayment::new(
            format!("rcg_{user_id}_{order_id}"),
            user_id.to_string(),
            MinorUnits::from(amount),
            format!("receipt_{order_id}"),
        )
        .with_provider("razorpay")
        .with_provider_order_id(order_id);
        self.db.insert_payment(payment).await.expect("Error adding payment")
    }

    pub async fn tear_down(mut self) {
        self.db.close().await;
        drop_database(&self.url).await;
    }
}
