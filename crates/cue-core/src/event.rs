//! Event — a calendar entry an event-bound rule attaches to.

use serde::{Deserialize, Serialize};

/// A calendar entry. `event_id` and `calendar_id` come from the surrounding
/// calendar system; the pair is only unique within one user's data, so
/// storage scopes events to their owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
  pub event_id:    i64,
  pub calendar_id: i64,
  pub title:       String,
}
