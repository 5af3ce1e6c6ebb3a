//! Customer notifications for payment outcomes.
//!
//! [`EmailNotifier`] delivers plain-text emails over SMTP with STARTTLS. When no SMTP credentials are configured, the
//! server falls back to [`LogNotifier`], which only writes the notification to the log.
use chrono::Utc;
use credit_payment_engine::{
    db_types::MinorUnits,
    events::{EventHandlers, EventHooks, PaymentCompletedEvent, PaymentFailedEvent},
    traits::{NotificationOutcome, Notifier, NotifierError},
};
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport,
    AsyncTransport,
    Message,
    Tokio1Executor,
};
use log::*;

use crate::config::SmtpConfig;

const SUCCESS_SUBJECT: &str = "Payment Confirmation - Your Transaction was Successful";
const FAILURE_SUBJECT: &str = "Payment Failed - Action Required";
const SUCCESS_TEMPLATE: &str = include_str!("../templates/success.txt");
const FAILURE_TEMPLATE: &str = include_str!("../templates/failure.txt");
const EVENT_BUFFER_SIZE: usize = 25;

/// Fills in a notification template
pub fn render_message(template: &str, name: &str, amount: MinorUnits) -> String {
    let current_date = Utc::now().format("%d %B %Y").to_string();
    template
        .replace("{receiver_name}", name)
        .replace("{amount}", &amount.to_string())
        .replace("{current_date}", &current_date)
}

fn subject_and_template(outcome: NotificationOutcome) -> (&'static str, &'static str) {
    match outcome {
        NotificationOutcome::Success => (SUCCESS_SUBJECT, SUCCESS_TEMPLATE),
        NotificationOutcome::Failure => (FAILURE_SUBJECT, FAILURE_TEMPLATE),
    }
}

//-------------------------------------------------  EmailNotifier  ----------------------------------------------------
#[derive(Clone)]
pub struct EmailNotifier {
    sender: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl EmailNotifier {
    pub fn new(config: &SmtpConfig) -> Result<Self, NotifierError> {
        let sender = config
            .sender_email
            .parse::<Mailbox>()
            .map_err(|e| NotifierError::Configuration(format!("Invalid sender address. {e}")))?;
        let credentials = Credentials::new(config.sender_email.clone(), config.sender_password.reveal().clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| NotifierError::Configuration(format!("Could not configure the SMTP relay. {e}")))?
            .port(config.port)
            .credentials(credentials)
            .build();
        Ok(Self { sender, transport })
    }

    fn build_message(
        &self,
        email: &str,
        name: &str,
        amount: MinorUnits,
        outcome: NotificationOutcome,
    ) -> Result<Message, NotifierError> {
        let recipient = email
            .parse::<Mailbox>()
            .map_err(|e| NotifierError::DeliveryFailed(format!("Invalid recipient address {email}. {e}")))?;
        let (subject, template) = subject_and_template(outcome);
        Message::builder()
            .from(self.sender.clone())
            .to(recipient)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(render_message(template, name, amount))
            .map_err(|e| NotifierError::DeliveryFailed(e.to_string()))
    }
}

impl Notifier for EmailNotifier {
    async fn notify(
        &self,
        email: &str,
        name: &str,
        amount: MinorUnits,
        outcome: NotificationOutcome,
    ) -> Result<(), NotifierError> {
        let message = self.build_message(email, name, amount, outcome)?;
        self.transport.send(message).await.map_err(|e| NotifierError::DeliveryFailed(e.to_string()))?;
        info!("📧️ Payment {outcome} email sent to {email}");
        Ok(())
    }
}

//-------------------------------------------------  LogNotifier  ------------------------------------------------------
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    async fn notify(
        &self,
        email: &str,
        name: &str,
        amount: MinorUnits,
        outcome: NotificationOutcome,
    ) -> Result<(), NotifierError> {
        let (subject, _) = subject_and_template(outcome);
        info!("📧️ [not sent] To: {name} <{email}>. Subject: {subject}. Amount: {amount}");
        Ok(())
    }
}

//-----------------------------------------------  ConfiguredNotifier  -------------------------------------------------
/// The notifier chosen at startup
#[derive(Clone)]
pub enum ConfiguredNotifier {
    Email(EmailNotifier),
    Log(LogNotifier),
}

impl ConfiguredNotifier {
    /// Uses SMTP if it is configured and valid. Otherwise notifications are only logged.
    pub fn from_config(smtp: Option<&SmtpConfig>) -> Self {
        match smtp.map(EmailNotifier::new) {
            Some(Ok(notifier)) => Self::Email(notifier),
            Some(Err(e)) => {
                error!("📧️ Could not set up the email notifier. Notifications will only be logged. {e}");
                Self::Log(LogNotifier)
            },
            None => Self::Log(LogNotifier),
        }
    }
}

impl Notifier for ConfiguredNotifier {
    async fn notify(
        &self,
        email: &str,
        name: &str,
        amount: MinorUnits,
        outcome: NotificationOutcome,
    ) -> Result<(), NotifierError> {
        match self {
            Self::Email(n) => n.notify(email, name, amount, outcome).await,
            Self::Log(n) => n.notify(email, name, amount, outcome).await,
        }
    }
}

//-----------------------------------------------  Event handlers  -----------------------------------------------------
pub fn create_notification_event_handlers(notifier: ConfiguredNotifier) -> EventHandlers {
    let mut hooks = EventHooks::default();
    let n = notifier.clone();
    hooks.on_payment_completed(move |ev: PaymentCompletedEvent| {
        let notifier = n.clone();
        Box::pin(async move {
            let Some(recipient) = ev.recipient.as_ref() else {
                debug!("📧️ Payment {} has no recipient. No confirmation will be sent.", ev.payment.order_id);
                return;
            };
            if let Err(e) =
                notifier.notify(&recipient.email, &recipient.name, ev.amount(), NotificationOutcome::Success).await
            {
                warn!("📧️ Could not send the confirmation for payment {}. {e}", ev.payment.order_id);
            }
        })
    });
    hooks.on_payment_failed(move |ev: PaymentFailedEvent| {
        let notifier = notifier.clone();
        Box::pin(async move {
            let Some(recipient) = ev.recipient.as_ref() else {
                debug!("📧️ Payment {} has no recipient. No failure notice will be sent.", ev.payment.order_id);
                return;
            };
            debug!("📧️ Payment {} failed ({})", ev.payment.order_id, ev.reason);
            if let Err(e) =
                notifier.notify(&recipient.email, &recipient.name, ev.amount(), NotificationOutcome::Failure).await
            {
                warn!("📧️ Could not send the failure notice for payment {}. {e}", ev.payment.order_id);
            }
        })
    });
    EventHandlers::new(EVENT_BUFFER_SIZE, hooks)
}
