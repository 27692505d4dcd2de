//! Error type for `cue-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown rule kind: {0:?}")]
  UnknownRuleKind(String),

  /// A rule row whose subject columns don't match its kind discriminant.
  #[error("rule {0} is missing its subject columns")]
  MalformedRule(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
