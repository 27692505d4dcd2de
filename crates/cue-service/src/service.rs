//! [`RuleService`] — the guard pipelines in front of rule persistence.
//!
//! Every public operation runs a fixed sequence of checks inside one unit of
//! work and short-circuits on the first failure. The per-operation check
//! order is part of the observable contract and is pinned by tests. Notably,
//! the update operations check time collision before ownership, while create
//! and get resolve the user first; that asymmetry is preserved product
//! behaviour, not an accident of this implementation.

use chrono::{DateTime, Utc};
use cue_core::{
  RuleError,
  location::{LATITUDE_RANGE, LONGITUDE_RANGE},
  rule::{Rule, RuleEvent, RuleLocation, TimeWindow},
  tx::{Transactor, TxResult},
};

/// Rule management over any transactional store.
///
/// Cloning is as cheap as cloning the store handle.
#[derive(Clone)]
pub struct RuleService<S> {
  store: S,
}

// ─── Guard helpers ───────────────────────────────────────────────────────────

fn blank(title: &str) -> bool { title.trim().is_empty() }

/// Whether `window` overlaps any of `rules`, skipping `exclude` (the rule
/// being updated, matched by id). Linear scan over the user's full rule set;
/// closed intervals, so touching boundaries collide.
fn collides(rules: &[Rule], window: TimeWindow, exclude: Option<i64>) -> bool {
  rules
    .iter()
    .filter(|rule| exclude != Some(rule.rule_id()))
    .any(|rule| rule.window().overlaps(&window))
}

// ─── Operations ──────────────────────────────────────────────────────────────

impl<S: Transactor> RuleService<S> {
  pub fn new(store: S) -> Self { Self { store } }

  /// Create a rule bound to a calendar event.
  ///
  /// Check order: negative ids, blank title, unordered window, user lookup,
  /// collision against all the user's rules. The event is then looked up by
  /// `(event_id, calendar_id)` within the user's data and created with
  /// `title` if absent.
  pub async fn create_event_rule(
    &self,
    user_id: i64,
    event_id: i64,
    calendar_id: i64,
    title: &str,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
  ) -> TxResult<RuleEvent> {
    let title = title.to_owned();
    let window = TimeWindow::new(starts_at, ends_at);

    self
      .store
      .run_tx(move |tx| {
        if user_id < 0 || event_id < 0 || calendar_id < 0 {
          return Err(RuleError::NegativeIdentifier.into());
        }
        if blank(&title) {
          return Err(RuleError::TitleCannotBeBlank.into());
        }
        if !window.is_ordered() {
          return Err(RuleError::StartTimeMustBeBeforeEndTime.into());
        }

        let user = tx.find_user(user_id)?.ok_or(RuleError::UserNotFound)?;
        if collides(&tx.rules_by_user(&user)?, window, None) {
          return Err(RuleError::RuleAlreadyExistsForGivenTime.into());
        }

        let event = match tx.find_event(event_id, calendar_id, &user)? {
          Some(event) => event,
          None => tx.create_event(event_id, calendar_id, &title, &user)?,
        };

        let rule = tx.create_event_rule(&event, &user, window)?;
        tracing::debug!(rule_id = rule.rule_id, user_id, "created event rule");
        Ok(rule)
      })
      .await
  }

  /// Create a rule bound to a geofence.
  ///
  /// Check order: blank title, unordered window, latitude, longitude,
  /// radius, negative user id, user lookup, collision. The geofence checks
  /// run before the user is even looked at, so an out-of-range latitude is
  /// reported regardless of who asks. The geofence is found by exact match
  /// on all four of `(name, latitude, longitude, radius)` among the user's
  /// locations, or created if no such match exists.
  ///
  /// `title` is validated but bound to nothing; location rules carry no
  /// title of their own.
  #[allow(clippy::too_many_arguments)]
  pub async fn create_location_rule(
    &self,
    user_id: i64,
    title: &str,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    name: &str,
    latitude: f64,
    longitude: f64,
    radius: f64,
  ) -> TxResult<RuleLocation> {
    let title = title.to_owned();
    let name = name.to_owned();
    let window = TimeWindow::new(starts_at, ends_at);

    self
      .store
      .run_tx(move |tx| {
        if blank(&title) {
          return Err(RuleError::TitleCannotBeBlank.into());
        }
        if !window.is_ordered() {
          return Err(RuleError::StartTimeMustBeBeforeEndTime.into());
        }
        if !LATITUDE_RANGE.contains(&latitude) {
          return Err(RuleError::InvalidLatitude.into());
        }
        if !LONGITUDE_RANGE.contains(&longitude) {
          return Err(RuleError::InvalidLongitude.into());
        }
        // `!(x > 0)` rather than `x <= 0` so NaN is rejected too.
        if !(radius > 0.0) {
          return Err(RuleError::InvalidRadius.into());
        }
        if user_id < 0 {
          return Err(RuleError::NegativeIdentifier.into());
        }

        let user = tx.find_user(user_id)?.ok_or(RuleError::UserNotFound)?;
        if collides(&tx.rules_by_user(&user)?, window, None) {
          return Err(RuleError::RuleAlreadyExistsForGivenTime.into());
        }

        let existing = tx
          .locations_by_user(&user)?
          .into_iter()
          .find(|l| l.matches(&name, latitude, longitude, radius));
        let location = match existing {
          Some(location) => location,
          None => tx.create_location(&name, latitude, longitude, radius, &user)?,
        };

        let rule = tx.create_location_rule(&location, &user, window)?;
        tracing::debug!(rule_id = rule.rule_id, user_id, "created location rule");
        Ok(rule)
      })
      .await
  }

  /// Fetch an event-bound rule the user owns.
  ///
  /// Check order: negative ids, user lookup, type-specific rule lookup,
  /// ownership. A rule that exists but belongs to someone else is
  /// `NotAllowed`, never `RuleNotFound`.
  pub async fn event_rule_by_id(
    &self,
    user_id: i64,
    rule_id: i64,
  ) -> TxResult<RuleEvent> {
    self
      .store
      .run_tx(move |tx| {
        if user_id < 0 || rule_id < 0 {
          return Err(RuleError::NegativeIdentifier.into());
        }
        let user = tx.find_user(user_id)?.ok_or(RuleError::UserNotFound)?;
        let rule = tx.find_rule_event(rule_id)?.ok_or(RuleError::RuleNotFound)?;
        if rule.user.user_id != user.user_id {
          return Err(RuleError::NotAllowed.into());
        }
        Ok(rule)
      })
      .await
  }

  /// Fetch a location-bound rule the user owns. Same pipeline as
  /// [`Self::event_rule_by_id`], with the location-specific lookup.
  pub async fn location_rule_by_id(
    &self,
    user_id: i64,
    rule_id: i64,
  ) -> TxResult<RuleLocation> {
    self
      .store
      .run_tx(move |tx| {
        if user_id < 0 || rule_id < 0 {
          return Err(RuleError::NegativeIdentifier.into());
        }
        let user = tx.find_user(user_id)?.ok_or(RuleError::UserNotFound)?;
        let rule = tx
          .find_rule_location(rule_id)?
          .ok_or(RuleError::RuleNotFound)?;
        if rule.user.user_id != user.user_id {
          return Err(RuleError::NotAllowed.into());
        }
        Ok(rule)
      })
      .await
  }

  /// All rules the user owns, both kinds mixed, in stored order.
  pub async fn rules_by_user(&self, user_id: i64) -> TxResult<Vec<Rule>> {
    self
      .store
      .run_tx(move |tx| {
        if user_id < 0 {
          return Err(RuleError::NegativeIdentifier.into());
        }
        let user = tx.find_user(user_id)?.ok_or(RuleError::UserNotFound)?;
        tx.rules_by_user(&user)
      })
      .await
  }

  /// Move an event-bound rule to a new time window.
  ///
  /// Check order: unordered window, negative ids, user lookup, rule lookup,
  /// collision against the user's *other* rules (the rule itself is excluded
  /// by id, so re-submitting an overlapping-with-itself window succeeds),
  /// then ownership. Ownership deliberately comes after the collision scan;
  /// see the module docs.
  pub async fn update_event_rule(
    &self,
    user_id: i64,
    rule_id: i64,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
  ) -> TxResult<RuleEvent> {
    let window = TimeWindow::new(starts_at, ends_at);

    self
      .store
      .run_tx(move |tx| {
        if !window.is_ordered() {
          return Err(RuleError::StartTimeMustBeBeforeEndTime.into());
        }
        if user_id < 0 || rule_id < 0 {
          return Err(RuleError::NegativeIdentifier.into());
        }
        let user = tx.find_user(user_id)?.ok_or(RuleError::UserNotFound)?;
        let rule = tx.find_rule_event(rule_id)?.ok_or(RuleError::RuleNotFound)?;
        if collides(&tx.rules_by_user(&user)?, window, Some(rule_id)) {
          return Err(RuleError::RuleAlreadyExistsForGivenTime.into());
        }
        if rule.user.user_id != user.user_id {
          return Err(RuleError::NotAllowed.into());
        }

        let updated = tx.update_rule_event(&rule, window)?;
        tracing::debug!(rule_id, user_id, "updated event rule window");
        Ok(updated)
      })
      .await
  }

  /// Move a location-bound rule to a new time window. Same pipeline as
  /// [`Self::update_event_rule`], with the location-specific lookup.
  pub async fn update_location_rule(
    &self,
    user_id: i64,
    rule_id: i64,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
  ) -> TxResult<RuleLocation> {
    let window = TimeWindow::new(starts_at, ends_at);

    self
      .store
      .run_tx(move |tx| {
        if !window.is_ordered() {
          return Err(RuleError::StartTimeMustBeBeforeEndTime.into());
        }
        if user_id < 0 || rule_id < 0 {
          return Err(RuleError::NegativeIdentifier.into());
        }
        let user = tx.find_user(user_id)?.ok_or(RuleError::UserNotFound)?;
        let rule = tx
          .find_rule_location(rule_id)?
          .ok_or(RuleError::RuleNotFound)?;
        if collides(&tx.rules_by_user(&user)?, window, Some(rule_id)) {
          return Err(RuleError::RuleAlreadyExistsForGivenTime.into());
        }
        if rule.user.user_id != user.user_id {
          return Err(RuleError::NotAllowed.into());
        }

        let updated = tx.update_rule_location(&rule, window)?;
        tracing::debug!(rule_id, user_id, "updated location rule window");
        Ok(updated)
      })
      .await
  }

  /// Delete an event-bound rule the user owns.
  ///
  /// Check order: negative ids, user lookup, rule lookup, ownership.
  pub async fn delete_event_rule(
    &self,
    user_id: i64,
    rule_id: i64,
  ) -> TxResult<()> {
    self
      .store
      .run_tx(move |tx| {
        if user_id < 0 || rule_id < 0 {
          return Err(RuleError::NegativeIdentifier.into());
        }
        let user = tx.find_user(user_id)?.ok_or(RuleError::UserNotFound)?;
        let rule = tx.find_rule_event(rule_id)?.ok_or(RuleError::RuleNotFound)?;
        if rule.user.user_id != user.user_id {
          return Err(RuleError::NotAllowed.into());
        }

        tx.delete_rule_event(&rule)?;
        tracing::debug!(rule_id, user_id, "deleted event rule");
        Ok(())
      })
      .await
  }

  /// Delete a location-bound rule the user owns. Same pipeline as
  /// [`Self::delete_event_rule`].
  pub async fn delete_location_rule(
    &self,
    user_id: i64,
    rule_id: i64,
  ) -> TxResult<()> {
    self
      .store
      .run_tx(move |tx| {
        if user_id < 0 || rule_id < 0 {
          return Err(RuleError::NegativeIdentifier.into());
        }
        let user = tx.find_user(user_id)?.ok_or(RuleError::UserNotFound)?;
        let rule = tx
          .find_rule_location(rule_id)?
          .ok_or(RuleError::RuleNotFound)?;
        if rule.user.user_id != user.user_id {
          return Err(RuleError::NotAllowed.into());
        }

        tx.delete_rule_location(&rule)?;
        tracing::debug!(rule_id, user_id, "deleted location rule");
        Ok(())
      })
      .await
  }
}
