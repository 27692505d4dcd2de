//! The closed refusal taxonomy of the rule service.

use thiserror::Error;

/// Every way a rule-service operation can refuse to proceed.
///
/// The set is exhaustive: each public operation returns a success value or
/// exactly one of these, chosen by the first failing check in that
/// operation's fixed order. Storage faults are not part of the taxonomy;
/// they travel as [`TxError::Storage`](crate::tx::TxError::Storage).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RuleError {
  #[error("identifier must not be negative")]
  NegativeIdentifier,

  #[error("user not found")]
  UserNotFound,

  #[error("a rule already exists for the given time")]
  RuleAlreadyExistsForGivenTime,

  #[error("rule not found")]
  RuleNotFound,

  #[error("title cannot be blank")]
  TitleCannotBeBlank,

  #[error("start time must be before end time")]
  StartTimeMustBeBeforeEndTime,

  #[error("latitude must be within [-90, 90]")]
  InvalidLatitude,

  #[error("longitude must be within [-180, 180]")]
  InvalidLongitude,

  #[error("radius must be strictly positive")]
  InvalidRadius,

  #[error("rule belongs to another user")]
  NotAllowed,
}
