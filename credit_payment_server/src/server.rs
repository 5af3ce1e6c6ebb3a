use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use credit_payment_engine::{
    events::EventProducers,
    AuditLogApi,
    CheckoutApi,
    HistoryApi,
    ReconciliationApi,
    SqliteDatabase,
};
use log::*;
use razorpay_tools::RazorpayApi;

use crate::{
    auth::TokenValidator,
    config::ServerConfig,
    errors::ServerError,
    integrations::{
        email::{create_notification_event_handlers, ConfiguredNotifier},
        razorpay::RazorpayGateway,
    },
    middleware::JwtMiddlewareFactory,
    routes::{health, CreateOrderRoute, LogByIdRoute, LogsRoute, MyHistoryRoute, VerifyPaymentRoute},
};

const MAX_DB_CONNECTIONS: u32 = 25;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, MAX_DB_CONNECTIONS)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    if config.auto_migrate {
        db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    }
    let api = RazorpayApi::new(config.razorpay.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let gateway = RazorpayGateway::new(api);
    let notifier = ConfiguredNotifier::from_config(config.smtp.as_ref());
    let handlers = create_notification_event_handlers(notifier);
    let producers = handlers.producers();
    handlers.start_handlers().await;
    info!("📬️ Payment notification handlers started");
    let srv = create_server_instance(config, db, gateway, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    gateway: RazorpayGateway,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let reconciliation_config = config.reconciliation_config();
    let validator = TokenValidator::new(&config.auth);
    let gateway_timeout = config.gateway_timeout;
    let srv = HttpServer::new(move || {
        let checkout_api = CheckoutApi::new(db.clone(), gateway.clone()).with_gateway_timeout(gateway_timeout);
        let reconciliation_api =
            ReconciliationApi::new(db.clone(), gateway.clone(), producers.clone(), reconciliation_config.clone());
        let history_api = HistoryApi::new(db.clone());
        let audit_log_api = AuditLogApi::new(db.clone());
        // Routes that require authentication
        let auth_scope = web::scope("/api")
            .wrap(JwtMiddlewareFactory::new(validator.clone()))
            .service(CreateOrderRoute::<SqliteDatabase, RazorpayGateway>::new())
            .service(VerifyPaymentRoute::<SqliteDatabase, RazorpayGateway>::new())
            .service(MyHistoryRoute::<SqliteDatabase>::new())
            .service(LogsRoute::<SqliteDatabase>::new())
            .service(LogByIdRoute::<SqliteDatabase>::new());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("rcg::access_log"))
            .app_data(web::Data::new(checkout_api))
            .app_data(web::Data::new(reconciliation_api))
            .app_data(web::Data::new(history_api))
            .app_data(web::Data::new(audit_log_api))
            .service(health)
            .service(auth_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
