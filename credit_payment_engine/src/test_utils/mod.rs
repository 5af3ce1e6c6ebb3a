//! Helpers for tests that need a fresh database or a stand-in for the payment provider.
mod fake_provider;
pub mod prepare_env;

pub use fake_provider::{FakeProvider, FAKE_KEY_ID};
