//! User — the owning principal for rules.
//!
//! Users are created and destroyed by the surrounding account-management
//! layer; the rule service only ever reads them.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub user_id:  i64,
  pub username: String,
  pub email:    String,
}
