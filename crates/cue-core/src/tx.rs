//! Collaborator contracts: the repository bundle visible inside one unit of
//! work, and the transactional executor that scopes it to a single call.
//!
//! The bundle's methods are synchronous on purpose. A unit of work executes
//! on the store's dedicated connection thread (e.g. inside
//! `tokio_rusqlite::Connection::call`), never on the async runtime, so the
//! rule service can run its whole check-then-persist sequence without the
//! transaction ever spanning an await point.

use std::future::Future;

use thiserror::Error;

use crate::{
  error::RuleError,
  event::Event,
  location::Location,
  rule::{Rule, RuleEvent, RuleLocation, TimeWindow},
  user::User,
};

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Outcome of a unit of work: either a refusal from the closed taxonomy, or
/// a fatal storage fault. The transaction around the unit of work commits
/// only on `Ok`, so refusals are never partially applied.
#[derive(Debug, Error)]
pub enum TxError {
  #[error(transparent)]
  Rule(#[from] RuleError),

  #[error("storage error: {0}")]
  Storage(#[source] BoxError),
}

impl TxError {
  pub fn storage(e: impl Into<BoxError>) -> Self { Self::Storage(e.into()) }

  /// The taxonomy refusal, if this is one.
  pub fn as_rule(&self) -> Option<RuleError> {
    match self {
      Self::Rule(e) => Some(*e),
      Self::Storage(_) => None,
    }
  }
}

pub type TxResult<T> = Result<T, TxError>;

/// The repository bundle scoped to one unit of work.
///
/// Lookup misses are `Ok(None)`, never errors; the rule service converts
/// them to the appropriate taxonomy refusal. The `create_*` and `update_*`
/// methods return the persisted entity with storage-assigned identifiers
/// filled in.
pub trait RuleTx {
  // ── User lookup ───────────────────────────────────────────────────────

  fn find_user(&mut self, user_id: i64) -> TxResult<Option<User>>;

  // ── Events ────────────────────────────────────────────────────────────

  /// Look up an event by `(event_id, calendar_id)` within the user's data.
  fn find_event(
    &mut self,
    event_id: i64,
    calendar_id: i64,
    user: &User,
  ) -> TxResult<Option<Event>>;

  fn create_event(
    &mut self,
    event_id: i64,
    calendar_id: i64,
    title: &str,
    user: &User,
  ) -> TxResult<Event>;

  // ── Locations ─────────────────────────────────────────────────────────

  /// All geofences owned by the user; the service does the exact-match
  /// find-or-create scan over this list.
  fn locations_by_user(&mut self, user: &User) -> TxResult<Vec<Location>>;

  fn create_location(
    &mut self,
    name: &str,
    latitude: f64,
    longitude: f64,
    radius: f64,
    user: &User,
  ) -> TxResult<Location>;

  // ── Rules ─────────────────────────────────────────────────────────────

  /// All rules owned by the user, both kinds mixed, in stored order.
  fn rules_by_user(&mut self, user: &User) -> TxResult<Vec<Rule>>;

  fn find_rule_event(&mut self, rule_id: i64) -> TxResult<Option<RuleEvent>>;

  fn find_rule_location(
    &mut self,
    rule_id: i64,
  ) -> TxResult<Option<RuleLocation>>;

  fn create_event_rule(
    &mut self,
    event: &Event,
    user: &User,
    window: TimeWindow,
  ) -> TxResult<RuleEvent>;

  fn create_location_rule(
    &mut self,
    location: &Location,
    user: &User,
    window: TimeWindow,
  ) -> TxResult<RuleLocation>;

  fn update_rule_event(
    &mut self,
    rule: &RuleEvent,
    window: TimeWindow,
  ) -> TxResult<RuleEvent>;

  fn update_rule_location(
    &mut self,
    rule: &RuleLocation,
    window: TimeWindow,
  ) -> TxResult<RuleLocation>;

  /// Remove the rule; `true` if a row was actually deleted.
  fn delete_rule_event(&mut self, rule: &RuleEvent) -> TxResult<bool>;

  fn delete_rule_location(&mut self, rule: &RuleLocation) -> TxResult<bool>;
}

/// The transactional executor.
///
/// One transaction per call: opened at entry, committed only when the unit
/// of work returns `Ok`, rolled back otherwise. Early-exit validation
/// failures perform no writes, so their rollback is a no-op.
///
/// The method returns a `Send` future so the trait can be used in
/// multi-threaded async runtimes.
pub trait Transactor: Send + Sync {
  fn run_tx<T, F>(&self, work: F) -> impl Future<Output = TxResult<T>> + Send + '_
  where
    F: FnOnce(&mut dyn RuleTx) -> TxResult<T> + Send + 'static,
    T: Send + 'static;
}
