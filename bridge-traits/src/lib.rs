//! # Store Bridge Traits
//!
//! The contract between the catalog core and whatever relational store backs it.
//!
//! ## Overview
//!
//! The catalog core never talks to a database driver directly. It consumes:
//!
//! - [`QueryRow`](database::QueryRow) / [`QueryValue`](database::QueryValue) - one
//!   result row as a map of column names to loosely typed values
//! - [`RowStream`](database::RowStream) - a forward-only cursor over result rows,
//!   closed by the consumer once it is done with it
//! - [`DatabaseAdapter`](database::DatabaseAdapter) - async query/execute entry points
//!   implemented by the store driver (the native SQLite adapter lives in `core-catalog`)
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//! - [`LogLevel`](time::LogLevel) - Shared log level vocabulary
//!
//! ## Error Handling
//!
//! Every bridge operation returns [`BridgeError`](error::BridgeError). Adapters
//! should convert driver errors into `BridgeError::DatabaseError` with enough
//! context (statement kind, failing column) to be actionable.
//!
//! ## Thread Safety
//!
//! `DatabaseAdapter` requires `Send + Sync` so one adapter can be shared by all
//! repositories through an `Arc`. A `RowStream` is owned by a single consumer.

pub mod database;
pub mod error;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use database::{DatabaseAdapter, QueryRow, QueryRows, QueryValue, RowStream};
pub use time::{Clock, LogLevel, SystemClock};
