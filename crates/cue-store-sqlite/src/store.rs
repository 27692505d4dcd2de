//! [`SqliteStore`] — the SQLite implementation of the rule-store contracts.

use std::{future::Future, path::Path};

use cue_core::{
  event::Event,
  location::Location,
  rule::{Rule, RuleEvent, RuleLocation, TimeWindow},
  tx::{RuleTx, Transactor, TxError, TxResult},
  user::User,
};
use rusqlite::OptionalExtension as _;

use crate::{
  Error, Result,
  encode::{KIND_EVENT, KIND_LOCATION, RawRule, encode_dt},
  schema::SCHEMA,
};

/// The shared SELECT for rule rows: the rule itself, its owner, and both
/// possible subjects (the kind discriminant decides which join applies).
pub(crate) const RULE_SELECT: &str = "
  SELECT r.rule_id, r.kind, r.starts_at, r.ends_at,
         u.user_id, u.username, u.email,
         r.event_id, r.calendar_id, e.title,
         r.location_id, l.name, l.latitude, l.longitude, l.radius
  FROM rules r
  JOIN users u ON u.user_id = r.user_id
  LEFT JOIN events e
    ON e.event_id = r.event_id
   AND e.calendar_id = r.calendar_id
   AND e.user_id = r.user_id
  LEFT JOIN locations l ON l.location_id = r.location_id";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A rule store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert a user row and return it with its assigned id.
  ///
  /// User lifecycle belongs to the surrounding account-management layer;
  /// this exists for that layer and for tests. The rule service itself only
  /// ever reads users.
  pub async fn create_user(&self, username: &str, email: &str) -> Result<User> {
    let username = username.to_owned();
    let email = email.to_owned();
    let user = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (username, email) VALUES (?1, ?2)",
          rusqlite::params![username, email],
        )?;
        Ok(User { user_id: conn.last_insert_rowid(), username, email })
      })
      .await?;
    Ok(user)
  }
}

// ─── Transactor impl ─────────────────────────────────────────────────────────

impl Transactor for SqliteStore {
  fn run_tx<T, F>(
    &self,
    work: F,
  ) -> impl Future<Output = TxResult<T>> + Send + '_
  where
    F: FnOnce(&mut dyn RuleTx) -> TxResult<T> + Send + 'static,
    T: Send + 'static,
  {
    let conn = self.conn.clone();
    async move {
      let outcome = conn
        .call(move |conn| {
          let tx = conn.transaction()?;
          let result = {
            let mut scope = SqliteTx { tx: &tx };
            work(&mut scope)
          };
          match result {
            Ok(value) => {
              tx.commit()?;
              Ok(Ok(value))
            }
            Err(e) => {
              // No writes survive a refusal; checks and effects commit
              // together or not at all.
              tx.rollback()?;
              Ok(Err(e))
            }
          }
        })
        .await;

      match outcome {
        Ok(inner) => inner,
        Err(e) => Err(TxError::storage(Error::Database(e))),
      }
    }
  }
}

// ─── Unit-of-work scope ──────────────────────────────────────────────────────

/// The repository bundle over one open SQLite transaction.
struct SqliteTx<'c> {
  tx: &'c rusqlite::Transaction<'c>,
}

fn storage(e: rusqlite::Error) -> TxError { TxError::storage(e) }

impl SqliteTx<'_> {
  fn fetch_rule(&self, rule_id: i64, kind: &str) -> TxResult<Option<Rule>> {
    let sql = format!("{RULE_SELECT} WHERE r.rule_id = ?1 AND r.kind = ?2");
    let raw = self
      .tx
      .query_row(&sql, rusqlite::params![rule_id, kind], RawRule::from_row)
      .optional()
      .map_err(storage)?;
    raw
      .map(|raw| raw.into_rule().map_err(TxError::storage))
      .transpose()
  }

  fn insert_rule(
    &self,
    user: &User,
    kind: &str,
    window: TimeWindow,
    event: Option<&Event>,
    location: Option<&Location>,
  ) -> TxResult<i64> {
    self
      .tx
      .execute(
        "INSERT INTO rules
           (user_id, kind, starts_at, ends_at, event_id, calendar_id, location_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
          user.user_id,
          kind,
          encode_dt(window.starts_at),
          encode_dt(window.ends_at),
          event.map(|e| e.event_id),
          event.map(|e| e.calendar_id),
          location.map(|l| l.location_id),
        ],
      )
      .map_err(storage)?;
    Ok(self.tx.last_insert_rowid())
  }

  fn set_rule_window(&self, rule_id: i64, window: TimeWindow) -> TxResult<()> {
    self
      .tx
      .execute(
        "UPDATE rules SET starts_at = ?1, ends_at = ?2 WHERE rule_id = ?3",
        rusqlite::params![
          encode_dt(window.starts_at),
          encode_dt(window.ends_at),
          rule_id,
        ],
      )
      .map_err(storage)?;
    Ok(())
  }

  fn delete_rule(&self, rule_id: i64) -> TxResult<bool> {
    let changed = self
      .tx
      .execute("DELETE FROM rules WHERE rule_id = ?1", rusqlite::params![
        rule_id
      ])
      .map_err(storage)?;
    Ok(changed > 0)
  }
}

impl RuleTx for SqliteTx<'_> {
  // ── User lookup ───────────────────────────────────────────────────────

  fn find_user(&mut self, user_id: i64) -> TxResult<Option<User>> {
    self
      .tx
      .query_row(
        "SELECT user_id, username, email FROM users WHERE user_id = ?1",
        rusqlite::params![user_id],
        |row| {
          Ok(User {
            user_id:  row.get(0)?,
            username: row.get(1)?,
            email:    row.get(2)?,
          })
        },
      )
      .optional()
      .map_err(storage)
  }

  // ── Events ────────────────────────────────────────────────────────────

  fn find_event(
    &mut self,
    event_id: i64,
    calendar_id: i64,
    user: &User,
  ) -> TxResult<Option<Event>> {
    let title: Option<String> = self
      .tx
      .query_row(
        "SELECT title FROM events
         WHERE event_id = ?1 AND calendar_id = ?2 AND user_id = ?3",
        rusqlite::params![event_id, calendar_id, user.user_id],
        |row| row.get(0),
      )
      .optional()
      .map_err(storage)?;
    Ok(title.map(|title| Event { event_id, calendar_id, title }))
  }

  fn create_event(
    &mut self,
    event_id: i64,
    calendar_id: i64,
    title: &str,
    user: &User,
  ) -> TxResult<Event> {
    self
      .tx
      .execute(
        "INSERT INTO events (event_id, calendar_id, user_id, title)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![event_id, calendar_id, user.user_id, title],
      )
      .map_err(storage)?;
    Ok(Event { event_id, calendar_id, title: title.to_owned() })
  }

  // ── Locations ─────────────────────────────────────────────────────────

  fn locations_by_user(&mut self, user: &User) -> TxResult<Vec<Location>> {
    let mut stmt = self
      .tx
      .prepare(
        "SELECT location_id, name, latitude, longitude, radius
         FROM locations WHERE user_id = ?1 ORDER BY location_id",
      )
      .map_err(storage)?;
    let rows = stmt
      .query_map(rusqlite::params![user.user_id], |row| {
        Ok(Location {
          location_id: row.get(0)?,
          name:        row.get(1)?,
          latitude:    row.get(2)?,
          longitude:   row.get(3)?,
          radius:      row.get(4)?,
        })
      })
      .map_err(storage)?
      .collect::<rusqlite::Result<Vec<_>>>()
      .map_err(storage)?;
    Ok(rows)
  }

  fn create_location(
    &mut self,
    name: &str,
    latitude: f64,
    longitude: f64,
    radius: f64,
    user: &User,
  ) -> TxResult<Location> {
    self
      .tx
      .execute(
        "INSERT INTO locations (user_id, name, latitude, longitude, radius)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![user.user_id, name, latitude, longitude, radius],
      )
      .map_err(storage)?;
    Ok(Location {
      location_id: self.tx.last_insert_rowid(),
      name: name.to_owned(),
      latitude,
      longitude,
      radius,
    })
  }

  // ── Rules ─────────────────────────────────────────────────────────────

  fn rules_by_user(&mut self, user: &User) -> TxResult<Vec<Rule>> {
    let sql = format!("{RULE_SELECT} WHERE r.user_id = ?1 ORDER BY r.rule_id");
    let mut stmt = self.tx.prepare(&sql).map_err(storage)?;
    let raws = stmt
      .query_map(rusqlite::params![user.user_id], RawRule::from_row)
      .map_err(storage)?
      .collect::<rusqlite::Result<Vec<_>>>()
      .map_err(storage)?;
    raws
      .into_iter()
      .map(|raw| raw.into_rule().map_err(TxError::storage))
      .collect()
  }

  fn find_rule_event(&mut self, rule_id: i64) -> TxResult<Option<RuleEvent>> {
    match self.fetch_rule(rule_id, KIND_EVENT)? {
      Some(Rule::Event(rule)) => Ok(Some(rule)),
      // Unreachable given the kind filter in the query.
      Some(Rule::Location(_)) => Ok(None),
      None => Ok(None),
    }
  }

  fn find_rule_location(
    &mut self,
    rule_id: i64,
  ) -> TxResult<Option<RuleLocation>> {
    match self.fetch_rule(rule_id, KIND_LOCATION)? {
      Some(Rule::Location(rule)) => Ok(Some(rule)),
      Some(Rule::Event(_)) => Ok(None),
      None => Ok(None),
    }
  }

  fn create_event_rule(
    &mut self,
    event: &Event,
    user: &User,
    window: TimeWindow,
  ) -> TxResult<RuleEvent> {
    let rule_id =
      self.insert_rule(user, KIND_EVENT, window, Some(event), None)?;
    Ok(RuleEvent {
      rule_id,
      window,
      user: user.clone(),
      event: event.clone(),
    })
  }

  fn create_location_rule(
    &mut self,
    location: &Location,
    user: &User,
    window: TimeWindow,
  ) -> TxResult<RuleLocation> {
    let rule_id =
      self.insert_rule(user, KIND_LOCATION, window, None, Some(location))?;
    Ok(RuleLocation {
      rule_id,
      window,
      user: user.clone(),
      location: location.clone(),
    })
  }

  fn update_rule_event(
    &mut self,
    rule: &RuleEvent,
    window: TimeWindow,
  ) -> TxResult<RuleEvent> {
    self.set_rule_window(rule.rule_id, window)?;
    let mut updated = rule.clone();
    updated.window = window;
    Ok(updated)
  }

  fn update_rule_location(
    &mut self,
    rule: &RuleLocation,
    window: TimeWindow,
  ) -> TxResult<RuleLocation> {
    self.set_rule_window(rule.rule_id, window)?;
    let mut updated = rule.clone();
    updated.window = window;
    Ok(updated)
  }

  fn delete_rule_event(&mut self, rule: &RuleEvent) -> TxResult<bool> {
    self.delete_rule(rule.rule_id)
  }

  fn delete_rule_location(&mut self, rule: &RuleLocation) -> TxResult<bool> {
    self.delete_rule(rule.rule_id)
  }
}
