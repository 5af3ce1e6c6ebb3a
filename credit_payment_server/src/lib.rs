//! # Credit payment server
//! This crate hosts the HTTP front end of the credit payment gateway. It is responsible for:
//! * Creating provider orders on behalf of authenticated users.
//! * Receiving the checkout result and handing it to the reconciliation engine, which confirms the payment with the
//!   provider and grants credits.
//! * Serving each user's payment history, and the verification audit log to administrators.
//! * Emailing customers when a payment completes or fails.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `GET /health`: A health check route that returns a 200 OK response.
//! * `POST /api/create-order`: Creates an order with the payment provider.
//! * `POST /api/verify-payment`: Verifies a completed checkout and grants credits.
//! * `GET /api/history`: The authenticated user's payment history.
//! * `GET /api/logs`, `GET /api/logs/id`: The verification audit log. Requires the `read_all` role.
//!
//! Every `/api` route needs an `Authorization: Bearer <token>` header.

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
