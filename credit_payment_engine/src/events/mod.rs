//! Payment outcome events.
//!
//! The reconciliation engine publishes an event whenever a payment actually changes state as a result of a
//! verification: [`PaymentCompletedEvent`] when it is settled, and [`PaymentFailedEvent`] when it is marked as failed.
//! Replays of an already-settled payment publish nothing, so subscribers see at most one event per outcome.
mod channel;
mod event_types;
mod hooks;

pub use channel::{EventHandler, EventProducer, Handler};
pub use event_types::*;
pub use hooks::{EventHandlers, EventHooks, EventProducers};
