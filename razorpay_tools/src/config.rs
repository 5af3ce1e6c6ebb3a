use std::time::Duration;

use log::*;
use rcg_common::Secret;

pub const DEFAULT_RAZORPAY_API_URL: &str = "https://api.razorpay.com/v1";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct RazorpayConfig {
    /// Base URL of the REST API, without a trailing slash.
    pub api_url: String,
    /// The public key id. This is also handed to the checkout front-end.
    pub key_id: String,
    /// The key secret. Used for basic auth and as the HMAC key for payment signatures.
    pub key_secret: Secret<String>,
    /// Hard upper bound on the duration of any single request to Razorpay.
    pub request_timeout: Duration,
}

impl Default for RazorpayConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_RAZORPAY_API_URL.to_string(),
            key_id: String::default(),
            key_secret: Secret::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl RazorpayConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_url = std::env::var("RCG_RAZORPAY_API_URL")
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| DEFAULT_RAZORPAY_API_URL.to_string());
        let key_id = std::env::var("RCG_RAZORPAY_KEY_ID").unwrap_or_else(|_| {
            warn!("RCG_RAZORPAY_KEY_ID not set. Orders cannot be created until it is configured.");
            String::default()
        });
        let key_secret = Secret::new(std::env::var("RCG_RAZORPAY_KEY_SECRET").unwrap_or_else(|_| {
            warn!("RCG_RAZORPAY_KEY_SECRET not set. Payment signatures will not validate until it is configured.");
            String::default()
        }));
        let request_timeout = std::env::var("RCG_GATEWAY_TIMEOUT")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("Invalid value for RCG_GATEWAY_TIMEOUT ({s}). {e}. Using the default."))
                    .ok()
            })
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT);
        Self { api_url, key_id, key_secret, request_timeout }
    }

    pub fn new(key_id: &str, key_secret: &str) -> Self {
        Self { key_id: key_id.to_string(), key_secret: Secret::new(key_secret.to_string()), ..Default::default() }
    }

    pub fn with_api_url(mut self, url: &str) -> Self {
        self.api_url = url.trim_end_matches('/').to_string();
        self
    }
}
