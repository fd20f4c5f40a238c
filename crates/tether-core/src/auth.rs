//! The authenticator contract.
//!
//! Token issuance and verification live outside this system; all the
//! registry needs is a way to turn a bearer token into a caller identity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The authenticated principal attached to a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallerIdentity {
  pub user_id: Uuid,
  pub brn:     Option<String>,
  pub tin:     Option<String>,
}

/// Boundary collaborator that resolves bearer tokens.
///
/// Implementations must be cheap to call per request; failures mean the
/// request is unauthenticated, never a process-level fault.
pub trait Authenticator: Send + Sync {
  /// Resolve `token` to a caller identity, or `None` if the token is
  /// unknown, expired, or malformed.
  fn authenticate(&self, token: &str) -> Option<CallerIdentity>;
}
