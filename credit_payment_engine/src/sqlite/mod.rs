//! SQLite backend for the credit payment engine.
//!
//! Schema migrations are embedded in the binary and can be applied with [`SqliteDatabase::run_migrations`].
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
