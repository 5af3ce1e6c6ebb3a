use std::{env, time::Duration};

use credit_payment_engine::verification_objects::{ReconciliationConfig, DEFAULT_GATEWAY_TIMEOUT};
use log::*;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use razorpay_tools::RazorpayConfig;
use rcg_common::{helpers::parse_boolean_flag, Secret};

use crate::errors::ServerError;

const DEFAULT_RCG_HOST: &str = "127.0.0.1";
const DEFAULT_RCG_PORT: u16 = 8370;
const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_SMTP_PORT: u16 = 587;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    pub razorpay: RazorpayConfig,
    /// Upper bound on every call the engine makes to the payment provider
    pub gateway_timeout: Duration,
    /// If false, verification requests without a payment signature are accepted. **DANGER**
    pub require_signature: bool,
    /// Outgoing mail settings. When `None`, notifications are only logged.
    pub smtp: Option<SmtpConfig>,
    /// Apply outstanding database migrations at startup
    pub auto_migrate: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RCG_HOST.to_string(),
            port: DEFAULT_RCG_PORT,
            database_url: String::default(),
            auth: AuthConfig::default(),
            razorpay: RazorpayConfig::default(),
            gateway_timeout: DEFAULT_GATEWAY_TIMEOUT,
            require_signature: true,
            smtp: None,
            auto_migrate: true,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("RCG_HOST").ok().unwrap_or_else(|| DEFAULT_RCG_HOST.into());
        let port = env::var("RCG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for RCG_PORT. {e} Using the default, {DEFAULT_RCG_PORT}, instead."
                    );
                    DEFAULT_RCG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_RCG_PORT);
        let database_url = env::var("RCG_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ RCG_DATABASE_URL is not set. Please set it to the URL for the credit store database.");
            String::default()
        });
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to the \
                 default configuration."
            );
            AuthConfig::default()
        });
        let razorpay = RazorpayConfig::new_from_env_or_default();
        let gateway_timeout = configure_gateway_timeout();
        let require_signature = parse_boolean_flag(env::var("RCG_REQUIRE_SIGNATURE").ok(), true);
        if !require_signature {
            warn!("🚨️ Payment signatures are optional. Unsigned verification requests will be accepted. 🚨️");
        }
        let smtp = SmtpConfig::from_env();
        let auto_migrate = parse_boolean_flag(env::var("RCG_AUTO_MIGRATE").ok(), true);
        Self { host, port, database_url, auth, razorpay, gateway_timeout, require_signature, smtp, auto_migrate }
    }

    /// The subset of the configuration that the reconciliation engine needs
    pub fn reconciliation_config(&self) -> ReconciliationConfig {
        ReconciliationConfig {
            key_secret: self.razorpay.key_secret.clone(),
            require_signature: self.require_signature,
            gateway_timeout: self.gateway_timeout,
        }
    }
}

fn configure_gateway_timeout() -> Duration {
    env::var("RCG_GATEWAY_TIMEOUT")
        .map_err(|_| {
            info!(
                "🪛️ RCG_GATEWAY_TIMEOUT is not set. Using the default value of {}s.",
                DEFAULT_GATEWAY_TIMEOUT.as_secs()
            )
        })
        .and_then(|s| {
            s.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| warn!("🪛️ Invalid configuration value for RCG_GATEWAY_TIMEOUT. {e}"))
        })
        .ok()
        .filter(|d| !d.is_zero())
        .unwrap_or(DEFAULT_GATEWAY_TIMEOUT)
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The HS256 secret shared with the service that issues access tokens.
    pub jwt_secret: Secret<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The JWT secret has not been set. I'm using a random value for this session. No externally issued \
             token will be accepted. Set RCG_JWT_SECRET to the secret used by your token issuer. 🚨️🚨️🚨️"
        );
        let secret = thread_rng().sample_iter(&Alphanumeric).take(48).map(char::from).collect::<String>();
        Self { jwt_secret: Secret::new(secret) }
    }
}

impl AuthConfig {
    pub fn new(secret: &str) -> Self {
        Self { jwt_secret: Secret::new(secret.to_string()) }
    }

    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret =
            env::var("RCG_JWT_SECRET").map_err(|e| ServerError::ConfigurationError(format!("{e} [RCG_JWT_SECRET]")))?;
        if secret.trim().is_empty() {
            return Err(ServerError::ConfigurationError("RCG_JWT_SECRET is empty".into()));
        }
        Ok(Self::new(&secret))
    }
}

//-------------------------------------------------  SmtpConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// Also the SMTP login
    pub sender_email: String,
    pub sender_password: Secret<String>,
}

impl SmtpConfig {
    /// Returns `None` unless both the sender address and password are set.
    pub fn from_env() -> Option<Self> {
        let sender_email = env::var("RCG_SENDER_EMAIL").ok().filter(|s| !s.trim().is_empty());
        let sender_password = env::var("RCG_SENDER_PASSWORD").ok().filter(|s| !s.is_empty());
        let (sender_email, sender_password) = match (sender_email, sender_password) {
            (Some(e), Some(p)) => (e, Secret::new(p)),
            _ => {
                info!("🪛️ RCG_SENDER_EMAIL or RCG_SENDER_PASSWORD is not set. Payment emails will only be logged.");
                return None;
            },
        };
        let host = env::var("RCG_SMTP_HOST").ok().unwrap_or_else(|| DEFAULT_SMTP_HOST.into());
        let port = env::var("RCG_SMTP_PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().map_err(|e| warn!("🪛️ Invalid value for RCG_SMTP_PORT ({s}). {e}")).ok())
            .unwrap_or(DEFAULT_SMTP_PORT);
        info!("🪛️ Payment emails will be sent from {sender_email} via {host}:{port}");
        Some(Self { host, port, sender_email, sender_password })
    }
}
