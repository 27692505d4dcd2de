//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings; rule kinds as the strings
//! `'event'` / `'location'`.

use chrono::{DateTime, Utc};
use cue_core::{
  event::Event,
  location::Location,
  rule::{Rule, RuleEvent, RuleLocation, TimeWindow},
  user::User,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Rule kind ───────────────────────────────────────────────────────────────

pub const KIND_EVENT: &str = "event";
pub const KIND_LOCATION: &str = "location";

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read from a `rules` row joined with its user and subject.
pub struct RawRule {
  // rules columns
  pub rule_id:   i64,
  pub kind:      String,
  pub starts_at: String,
  pub ends_at:   String,
  // users join
  pub user_id:   i64,
  pub username:  String,
  pub email:     String,
  // events join (kind = 'event')
  pub event_id:    Option<i64>,
  pub calendar_id: Option<i64>,
  pub event_title: Option<String>,
  // locations join (kind = 'location')
  pub location_id: Option<i64>,
  pub name:        Option<String>,
  pub latitude:    Option<f64>,
  pub longitude:   Option<f64>,
  pub radius:      Option<f64>,
}

impl RawRule {
  /// Map a row produced by [`crate::store::RULE_SELECT`], column for column.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      rule_id:     row.get(0)?,
      kind:        row.get(1)?,
      starts_at:   row.get(2)?,
      ends_at:     row.get(3)?,
      user_id:     row.get(4)?,
      username:    row.get(5)?,
      email:       row.get(6)?,
      event_id:    row.get(7)?,
      calendar_id: row.get(8)?,
      event_title: row.get(9)?,
      location_id: row.get(10)?,
      name:        row.get(11)?,
      latitude:    row.get(12)?,
      longitude:   row.get(13)?,
      radius:      row.get(14)?,
    })
  }

  pub fn into_rule(self) -> Result<Rule> {
    let window =
      TimeWindow::new(decode_dt(&self.starts_at)?, decode_dt(&self.ends_at)?);
    let user = User {
      user_id:  self.user_id,
      username: self.username,
      email:    self.email,
    };

    match self.kind.as_str() {
      KIND_EVENT => {
        let (Some(event_id), Some(calendar_id), Some(title)) =
          (self.event_id, self.calendar_id, self.event_title)
        else {
          return Err(Error::MalformedRule(self.rule_id));
        };
        Ok(Rule::Event(RuleEvent {
          rule_id: self.rule_id,
          window,
          user,
          event: Event { event_id, calendar_id, title },
        }))
      }
      KIND_LOCATION => {
        let (Some(location_id), Some(name), Some(latitude), Some(longitude), Some(radius)) = (
          self.location_id,
          self.name,
          self.latitude,
          self.longitude,
          self.radius,
        ) else {
          return Err(Error::MalformedRule(self.rule_id));
        };
        Ok(Rule::Location(RuleLocation {
          rule_id: self.rule_id,
          window,
          user,
          location: Location { location_id, name, latitude, longitude, radius },
        }))
      }
      other => Err(Error::UnknownRuleKind(other.to_owned())),
    }
  }
}
