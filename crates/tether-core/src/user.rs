//! User types — the identity side of the registry.
//!
//! A user's owned gadgets are kept as a reference *set* (a join table in
//! storage), so duplicate references are impossible by construction.
//! Credentials are handled by an external authenticator and never stored
//! here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── User ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub user_id:      Uuid,
  pub created_at:   DateTime<Utc>,
  pub full_name:    String,
  pub email:        String,
  pub address:      Option<String>,
  pub phone_number: Option<String>,
  /// Business registration number. At least one of `brn`/`tin` is present.
  pub brn:          Option<String>,
  /// Tax identification number.
  pub tin:          Option<String>,
  pub category:     Option<String>,
}

/// Input to [`crate::store::RegistryStore::add_user`]. `user_id` and
/// `created_at` are assigned by the store.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
  pub full_name:    String,
  pub email:        String,
  pub address:      Option<String>,
  pub phone_number: Option<String>,
  pub brn:          Option<String>,
  pub tin:          Option<String>,
  pub category:     Option<String>,
}

impl NewUser {
  /// A user must be reachable by at least one human-facing designator.
  pub fn validate(&self) -> Result<()> {
    if self.brn.is_none() && self.tin.is_none() {
      return Err(Error::MissingDesignator);
    }
    Ok(())
  }
}

// ─── Owner designator ────────────────────────────────────────────────────────

/// The human-facing key a caller uses to name a transfer recipient, distinct
/// from the internal user id.
///
/// When both identifiers are supplied, lookups require both to match the
/// same user (AND semantics).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerDesignator {
  pub brn: Option<String>,
  pub tin: Option<String>,
}

impl OwnerDesignator {
  /// Build a designator, rejecting the empty case up front.
  pub fn new(brn: Option<String>, tin: Option<String>) -> Result<Self> {
    let brn = brn.filter(|s| !s.trim().is_empty());
    let tin = tin.filter(|s| !s.trim().is_empty());
    if brn.is_none() && tin.is_none() {
      return Err(Error::MissingDesignator);
    }
    Ok(Self { brn, tin })
  }
}
