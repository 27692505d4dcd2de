//! Core types and trait definitions for the cue rule service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod error;
pub mod event;
pub mod location;
pub mod rule;
pub mod tx;
pub mod user;

pub use error::RuleError;
pub use tx::{TxError, TxResult};
