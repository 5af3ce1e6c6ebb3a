use actix_web::{http::StatusCode, test, test::TestRequest, web, App};
use credit_payment_engine::{
    db_types::{AuditLogEntry, AuditStatus, MinorUnits, NewAuditLogEntry},
    AuditLog,
    AuditLogApi,
    SqliteDatabase,
};

use super::helpers::{bearer, call, issue_token, send, test_db, validator, TestDb};
use crate::{
    auth::Role,
    middleware::JwtMiddlewareFactory,
    routes::{LogByIdRoute, LogsRoute},
};

fn configure(api: AuditLogApi<SqliteDatabase>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(api)).service(
            web::scope("/api")
                .wrap(JwtMiddlewareFactory::new(validator()))
                .service(LogsRoute::<SqliteDatabase>::new())
                .service(LogByIdRoute::<SqliteDatabase>::new()),
        );
    }
}

async fn seed_logs(store: &TestDb) {
    let entries = [
        ("order_AAA111", AuditStatus::Completed, 1_000),
        ("order_BBB222", AuditStatus::Failed, 2_000),
        ("order_CCC333", AuditStatus::Pending, 3_000),
    ];
    for (txnid, status, amount) in entries {
        store.db.upsert_log(NewAuditLogEntry::new(txnid, status, MinorUnits::from(amount))).await.unwrap();
    }
}

fn get(uri: &str, roles: Vec<Role>) -> TestRequest {
    let token = issue_token("admin", roles);
    TestRequest::get().uri(uri).insert_header(bearer(&token))
}

#[actix_web::test]
async fn ordinary_users_cannot_read_logs() {
    let _ = env_logger::try_init();
    let store = test_db().await;
    let api = AuditLogApi::new(store.db.clone());
    let (status, body) = send(get("/api/logs", vec![Role::User]), configure(api)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("Insufficient Permissions"), "was: {body}");
    store.tear_down().await;
}

#[actix_web::test]
async fn empty_log() {
    let _ = env_logger::try_init();
    let store = test_db().await;
    let api = AuditLogApi::new(store.db.clone());
    let (status, body) = send(get("/api/logs", vec![Role::User, Role::ReadAll]), configure(api)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"message":"Log not found"}"#);
    store.tear_down().await;
}

#[actix_web::test]
async fn fetch_logs() {
    let _ = env_logger::try_init();
    let store = test_db().await;
    seed_logs(&store).await;
    let api = AuditLogApi::new(store.db.clone());
    let app = test::init_service(App::new().configure(configure(api))).await;
    let roles = vec![Role::ReadAll];

    let (status, body) = call(&app, get("/api/logs", roles.clone()).to_request()).await;
    assert_eq!(status, StatusCode::OK, "was: {body}");
    let logs: Vec<AuditLogEntry> = serde_json::from_str(&body).unwrap();
    assert_eq!(logs.len(), 3);

    let (status, body) = call(&app, get("/api/logs?status=failed", roles.clone()).to_request()).await;
    assert_eq!(status, StatusCode::OK, "was: {body}");
    let logs: Vec<AuditLogEntry> = serde_json::from_str(&body).unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].txnid, "order_BBB222");
    assert_eq!(logs[0].amount, MinorUnits::from(2_000));

    let (status, body) = call(&app, get("/api/logs?status=incomplete", roles.clone()).to_request()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"message":"Log not found"}"#);

    let (status, _) = call(&app, get("/api/logs?status=bogus", roles).to_request()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    store.tear_down().await;
}

#[actix_web::test]
async fn fetch_log_by_id() {
    let _ = env_logger::try_init();
    let store = test_db().await;
    seed_logs(&store).await;
    let api = AuditLogApi::new(store.db.clone());
    let app = test::init_service(App::new().configure(configure(api))).await;

    let (status, body) = call(&app, get("/api/logs/id?txn_id=order_CCC333", vec![Role::ReadAll]).to_request()).await;
    assert_eq!(status, StatusCode::OK, "was: {body}");
    let log: AuditLogEntry = serde_json::from_str(&body).unwrap();
    assert_eq!(log.status, AuditStatus::Pending);

    let (status, body) = call(&app, get("/api/logs/id?txn_id=order_ZZZ999", vec![Role::ReadAll]).to_request()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"message":"Log not found"}"#);
    store.tear_down().await;
}
