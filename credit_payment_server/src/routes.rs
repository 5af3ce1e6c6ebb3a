//! Request handler definitions
//!
//! Define each route and its handler here. Handlers that are more than a line or two belong in the engine, not here.
//!
//! Every handler is async, and every database or provider call is awaited, so a worker thread is never blocked while a
//! request waits on I/O. Handlers must never call blocking functions such as `std::thread::sleep`.
use actix_web::{get, rt, web, HttpResponse, Responder};
use credit_payment_engine::{
    checkout_objects::NewOrderRequest,
    traits::{AuditLog, CheckoutDatabase, PaymentProvider},
    verification_objects::VerificationRequest,
    AuditLogApi,
    CheckoutApi,
    HistoryApi,
    ReconciliationApi,
};
use log::*;

use crate::{
    auth::{JwtClaims, Role},
    data_objects::{
        CreateOrderResponse,
        LogIdQuery,
        LogQuery,
        MessageResponse,
        VerifyPaymentParams,
        VerifyPaymentResponse,
    },
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro.
// Each bound becomes a type parameter of the handler, in the order given.
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ident),+ where requires [$($roles:expr),+]) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds >],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds >] >,)+ );}
        paste::paste! { impl< $( [< T $bounds >],)+ > [<$name:camel Route>]< $( [< T $bounds >],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds >] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds>],)+>
        where
            $([<T $bounds>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds >], )+>)
                    .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),+]));
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ident),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds >],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds >] >,)+ );}
        paste::paste! { impl< $( [< T $bounds >],)+ > [<$name:camel Route>]< $( [< T $bounds >],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds >] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds>],)+>
        where
            $([<T $bounds>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Checkout  ----------------------------------------------------
route!(create_order => Post "/create-order" impl CheckoutDatabase, PaymentProvider);
/// Route handler for the create-order endpoint
///
/// Creates an order with the payment provider for the authenticated user and records it in the order ledger. The
/// response carries everything the checkout form needs: the provider's order id, the amount and currency, and the
/// provider's public key.
pub async fn create_order<B, P>(
    claims: JwtClaims,
    body: web::Json<NewOrderRequest>,
    api: web::Data<CheckoutApi<B, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: CheckoutDatabase,
    P: PaymentProvider,
{
    let request = body.into_inner();
    debug!("💻️ POST create_order for {}: {} {}", claims.sub, request.amount, request.currency);
    let order = api.create_order(&claims.sub, request).await.map_err(|e| {
        debug!("💻️ Could not create order for {}. {e}", claims.sub);
        ServerError::from(e)
    })?;
    Ok(HttpResponse::Ok().json(CreateOrderResponse::from(order)))
}

route!(verify_payment => Post "/verify-payment" impl CheckoutDatabase, PaymentProvider);
/// Route handler for the verify-payment endpoint
///
/// The body carries the identifiers the checkout form received from the provider. The payment is confirmed with the
/// provider and, if everything matches, credits are granted to the authenticated user.
///
/// Repeating a successful request is harmless: it returns the same result and grants nothing further.
pub async fn verify_payment<B, P>(
    claims: JwtClaims,
    body: web::Json<VerifyPaymentParams>,
    api: web::Data<ReconciliationApi<B, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: CheckoutDatabase + 'static,
    P: PaymentProvider + 'static,
{
    let request = VerificationRequest::from(body.into_inner());
    let user_id = claims.sub;
    debug!("💻️ POST verify_payment for {user_id}: {:?}", request.provider_payment_id);
    // A client that hangs up must not abandon a settlement halfway, so the verification runs in its own task
    let api = api.into_inner();
    let task = rt::spawn(async move { api.verify_payment(&user_id, request).await });
    let outcome = task.await.map_err(|e| {
        error!("💻️ The verification task did not complete. {e}");
        ServerError::Unspecified(e.to_string())
    })??;
    Ok(HttpResponse::Ok().json(VerifyPaymentResponse::from(outcome)))
}

//----------------------------------------------   History  ----------------------------------------------------
route!(my_history => Get "/history" impl CheckoutDatabase);
/// Route handler for the history endpoint
///
/// Returns the authenticated user's payments, most recent first.
pub async fn my_history<B: CheckoutDatabase>(
    claims: JwtClaims,
    api: web::Data<HistoryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_history for {}", claims.sub);
    let history = api.payment_history(&claims.sub).await.map_err(|e| {
        debug!("💻️ Could not fetch payment history for {}. {e}", claims.sub);
        ServerError::from(e)
    })?;
    Ok(HttpResponse::Ok().json(history))
}

//----------------------------------------------   Audit log  ----------------------------------------------------
route!(logs => Get "/logs" impl AuditLog where requires [Role::ReadAll]);
/// Route handler for the logs endpoint
///
/// Admin users (with the `ReadAll` role) can fetch every verification attempt, optionally filtered by status, e.g.
/// `/api/logs?status=failed`.
pub async fn logs<B: AuditLog>(
    query: web::Query<LogQuery>,
    api: web::Data<AuditLogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let status = query.into_inner().status;
    debug!("💻️ GET logs ({})", status.map(|s| s.to_string()).unwrap_or_else(|| "all".into()));
    let logs = api.logs(status).await?;
    if logs.is_empty() {
        return Ok(HttpResponse::NotFound().json(MessageResponse::new("Log not found")));
    }
    Ok(HttpResponse::Ok().json(logs))
}

route!(log_by_id => Get "/logs/id" impl AuditLog where requires [Role::ReadAll]);
pub async fn log_by_id<B: AuditLog>(
    query: web::Query<LogIdQuery>,
    api: web::Data<AuditLogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let txnid = query.into_inner().txn_id;
    debug!("💻️ GET log for {txnid}");
    match api.log_by_txnid(&txnid).await? {
        Some(log) => Ok(HttpResponse::Ok().json(log)),
        None => Ok(HttpResponse::NotFound().json(MessageResponse::new("Log not found"))),
    }
}
