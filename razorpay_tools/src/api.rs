use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
    StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    config::RazorpayConfig,
    helpers::parse_error_description,
    NewRazorpayOrder,
    RazorpayApiError,
    RazorpayOrder,
    RazorpayPayment,
};

#[derive(Clone)]
pub struct RazorpayApi {
    config: RazorpayConfig,
    client: Arc<Client>,
}

impl RazorpayApi {
    pub fn new(config: RazorpayConfig) -> Result<Self, RazorpayApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| RazorpayApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn key_id(&self) -> &str {
        self.config.key_id.as_str()
    }

    pub fn config(&self) -> &RazorpayConfig {
        &self.config
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        entity: &str,
        body: Option<B>,
    ) -> Result<T, RazorpayApiError> {
        let url = self.url(path);
        trace!("💳️ Sending REST query: {method} {url}");
        let mut req = self
            .client
            .request(method, url)
            .basic_auth(self.config.key_id.as_str(), Some(self.config.key_secret.reveal()));
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                RazorpayApiError::Timeout
            } else {
                RazorpayApiError::RequestError(e.to_string())
            }
        })?;
        let status = response.status();
        if status.is_success() {
            trace!("💳️ REST query successful. {status}");
            return response.json::<T>().await.map_err(|e| RazorpayApiError::JsonError(e.to_string()));
        }
        let body = response.text().await.map_err(|e| RazorpayApiError::RequestError(e.to_string()))?;
        let message = parse_error_description(&body);
        debug!("💳️ REST query failed. {status}. {message}");
        match status {
            StatusCode::NOT_FOUND => Err(RazorpayApiError::NotFound(entity.to_string())),
            StatusCode::TOO_MANY_REQUESTS => Err(RazorpayApiError::RateLimited),
            // Razorpay reports unknown ids as 400 BAD_REQUEST_ERROR rather than 404
            StatusCode::BAD_REQUEST if message.contains("does not exist") => {
                Err(RazorpayApiError::NotFound(entity.to_string()))
            },
            _ => Err(RazorpayApiError::QueryError { status: status.as_u16(), message }),
        }
    }

    /// Creates a new order. The amount is in the smallest currency unit.
    pub async fn create_order(&self, order: NewRazorpayOrder) -> Result<RazorpayOrder, RazorpayApiError> {
        debug!("💳️ Creating order for {} {} (receipt {})", order.amount, order.currency, order.receipt);
        let result: RazorpayOrder = self.rest_query(Method::POST, "/orders", "order", Some(order)).await?;
        info!("💳️ Razorpay order {} created", result.id);
        Ok(result)
    }

    pub async fn fetch_order(&self, order_id: &str) -> Result<RazorpayOrder, RazorpayApiError> {
        let path = format!("/orders/{order_id}");
        self.rest_query(Method::GET, &path, "order", None::<()>).await
    }

    pub async fn fetch_payment(&self, payment_id: &str) -> Result<RazorpayPayment, RazorpayApiError> {
        let path = format!("/payments/{payment_id}");
        let payment: RazorpayPayment = self.rest_query(Method::GET, &path, "payment", None::<()>).await?;
        debug!("💳️ Payment {} is {} for {} {}", payment.id, payment.status, payment.amount, payment.currency);
        Ok(payment)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url)
    }
}
