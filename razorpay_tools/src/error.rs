use thiserror::Error;

#[derive(Debug, Error)]
pub enum RazorpayApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Could not reach the Razorpay API: {0}")]
    RequestError(String),
    #[error("The request to the Razorpay API timed out")]
    Timeout,
    #[error("Razorpay could not find the requested {0}")]
    NotFound(String),
    #[error("Too many requests were sent to the Razorpay API")]
    RateLimited,
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
}

impl RazorpayApiError {
    /// Failures that may succeed if the same request is repeated later
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RequestError(_) | Self::Timeout | Self::RateLimited)
            || matches!(self, Self::QueryError { status, .. } if *status >= 500)
    }
}
