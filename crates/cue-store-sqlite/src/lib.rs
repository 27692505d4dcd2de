//! SQLite backend for the cue rule store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! connection thread without blocking the async runtime. The
//! [`Transactor`](cue_core::tx::Transactor) impl scopes every unit of work
//! to exactly one SQLite transaction.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
