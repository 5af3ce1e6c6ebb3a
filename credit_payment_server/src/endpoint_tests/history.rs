use actix_web::{http::StatusCode, test::TestRequest, web};
use credit_payment_engine::{
    db_types::NewUserAccount,
    history_objects::PaymentHistory,
    BalanceLedger,
    HistoryApi,
    SqliteDatabase,
};

use super::helpers::{bearer, issue_token, send, test_db, validator};
use crate::{auth::Role, middleware::JwtMiddlewareFactory, routes::MyHistoryRoute};

fn configure(api: HistoryApi<SqliteDatabase>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(api)).service(
            web::scope("/api")
                .wrap(JwtMiddlewareFactory::new(validator()))
                .service(MyHistoryRoute::<SqliteDatabase>::new()),
        );
    }
}

#[actix_web::test]
async fn fetch_my_history() {
    let _ = env_logger::try_init();
    let store = test_db().await;
    store.db.create_user_account(NewUserAccount::new("bob", "bob@example.com", "Bob").with_credits(25)).await.unwrap();
    store.add_order("bob", "order_AAA111", 1_000).await;
    store.add_order("bob", "order_BBB222", 2_000).await;
    store.add_order("alice", "order_CCC333", 3_000).await;
    let api = HistoryApi::new(store.db.clone());
    let token = issue_token("bob", vec![Role::User]);
    let req = TestRequest::get().uri("/api/history").insert_header(bearer(&token));
    let (status, body) = send(req, configure(api)).await;
    assert_eq!(status, StatusCode::OK, "was: {body}");
    let history: PaymentHistory = serde_json::from_str(&body).unwrap();
    let ids = history.payments.iter().map(|p| p.order_id.as_str()).collect::<Vec<_>>();
    assert_eq!(ids, vec!["BBB222", "AAA111"]);
    assert!(history.payments.iter().all(|p| p.remaining_credits == 25));
    assert!(history.payments.iter().all(|p| p.join_date.is_some()));
    store.tear_down().await;
}

#[actix_web::test]
async fn history_of_a_new_user_is_empty() {
    let _ = env_logger::try_init();
    let store = test_db().await;
    let api = HistoryApi::new(store.db.clone());
    let token = issue_token("alice", vec![Role::User]);
    let req = TestRequest::get().uri("/api/history").insert_header(bearer(&token));
    let (status, body) = send(req, configure(api)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"payments":[]}"#);
    store.tear_down().await;
}

#[actix_web::test]
async fn history_requires_a_token() {
    let _ = env_logger::try_init();
    let store = test_db().await;
    let api = HistoryApi::new(store.db.clone());
    let (status, _) = send(TestRequest::get().uri("/api/history"), configure(api)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    store.tear_down().await;
}
