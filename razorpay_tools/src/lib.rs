//! A thin client for the Razorpay REST API.
//!
//! Only the calls needed to run a checkout are provided: creating an order, and looking up orders and payments by id.
//! Requests are authenticated with HTTP basic auth using the key id and key secret from [`RazorpayConfig`].
mod api;
mod config;
mod error;

mod data_objects;
pub mod helpers;

pub use api::RazorpayApi;
pub use config::RazorpayConfig;
pub use data_objects::{NewRazorpayOrder, RazorpayOrder, RazorpayPayment};
pub use error::RazorpayApiError;
