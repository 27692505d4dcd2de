//! Rule types — a user-owned time window bound to an event or a location.
//!
//! The polymorphic subject is expressed as a tagged sum type ([`Rule`]) over
//! two concrete record types, not as inheritance. A rule's creator and
//! subject never change after creation; only the time window is mutable,
//! and only through the rule service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{event::Event, location::Location, user::User};

// ─── TimeWindow ──────────────────────────────────────────────────────────────

/// The `[start, end]` interval a rule is armed for.
///
/// Both endpoints are inclusive for collision purposes: two windows that
/// merely touch at a boundary still collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
  pub starts_at: DateTime<Utc>,
  pub ends_at:   DateTime<Utc>,
}

impl TimeWindow {
  pub fn new(starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> Self {
    Self { starts_at, ends_at }
  }

  /// Whether the window is well-formed: start strictly before end.
  /// Equal endpoints are rejected, on creation and on update alike.
  pub fn is_ordered(&self) -> bool { self.starts_at < self.ends_at }

  /// Closed-interval overlap test. Touching boundaries count as overlap;
  /// this is deliberately not a strict-inequality test.
  pub fn overlaps(&self, other: &TimeWindow) -> bool {
    self.starts_at <= other.ends_at && self.ends_at >= other.starts_at
  }
}

// ─── Rule variants ───────────────────────────────────────────────────────────

/// A rule bound to a calendar event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleEvent {
  pub rule_id: i64,
  pub window:  TimeWindow,
  /// The creating user; never changes after creation.
  pub user:    User,
  pub event:   Event,
}

/// A rule bound to a geofence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleLocation {
  pub rule_id:  i64,
  pub window:   TimeWindow,
  /// The creating user; never changes after creation.
  pub user:     User,
  pub location: Location,
}

/// A rule of either kind, as returned by per-user listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Rule {
  Event(RuleEvent),
  Location(RuleLocation),
}

impl Rule {
  pub fn rule_id(&self) -> i64 {
    match self {
      Self::Event(rule) => rule.rule_id,
      Self::Location(rule) => rule.rule_id,
    }
  }

  pub fn window(&self) -> TimeWindow {
    match self {
      Self::Event(rule) => rule.window,
      Self::Location(rule) => rule.window,
    }
  }

  pub fn user(&self) -> &User {
    match self {
      Self::Event(rule) => &rule.user,
      Self::Location(rule) => &rule.user,
    }
  }
}
