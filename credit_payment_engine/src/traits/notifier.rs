use std::fmt::Display;

use thiserror::Error;

use crate::db_types::MinorUnits;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationOutcome {
    Success,
    Failure,
}

impl Display for NotificationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationOutcome::Success => write!(f, "success"),
            NotificationOutcome::Failure => write!(f, "failure"),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum NotifierError {
    #[error("The notifier is not configured correctly. {0}")]
    Configuration(String),
    #[error("Could not deliver the notification. {0}")]
    DeliveryFailed(String),
}

/// Tells a customer how their payment went.
///
/// Notifications are fired from event hooks after the fact. Errors are for logging only; a failed notification never
/// changes the outcome of a payment.
#[allow(async_fn_in_trait)]
pub trait Notifier {
    async fn notify(
        &self,
        email: &str,
        name: &str,
        amount: MinorUnits,
        outcome: NotificationOutcome,
    ) -> Result<(), NotifierError>;
}
