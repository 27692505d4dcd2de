//! The rule service — validation and orchestration for event- and
//! location-bound rules.
//!
//! Everything here is generic over a [`cue_core::tx::Transactor`], so the
//! same pipeline runs against the SQLite backend in production and against a
//! scripted in-memory store in tests.

mod service;

pub use service::RuleService;
