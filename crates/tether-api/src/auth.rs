//! Bearer-token extraction and the static token authenticator.
//!
//! Token issuance is an external concern; this module only resolves
//! already-issued tokens against a config-supplied table.

use std::collections::HashMap;

use axum::http::{HeaderMap, header};
use tether_core::auth::{Authenticator, CallerIdentity};

use crate::{ApiError, TokenEntry};

/// An [`Authenticator`] backed by the `auth_tokens` table in the server
/// configuration. Suitable for small deployments and tests.
pub struct StaticTokenAuthenticator {
  tokens: HashMap<String, CallerIdentity>,
}

impl StaticTokenAuthenticator {
  pub fn new(entries: impl IntoIterator<Item = TokenEntry>) -> Self {
    let tokens = entries
      .into_iter()
      .map(|e| {
        (
          e.token,
          CallerIdentity {
            user_id: e.user_id,
            brn:     e.brn,
            tin:     e.tin,
          },
        )
      })
      .collect();
    Self { tokens }
  }
}

impl Authenticator for StaticTokenAuthenticator {
  fn authenticate(&self, token: &str) -> Option<CallerIdentity> {
    self.tokens.get(token).cloned()
  }
}

/// Resolve the request's `Authorization: Bearer` header to a caller
/// identity, or fail with 401.
pub fn require_caller(
  headers: &HeaderMap,
  auth: &dyn Authenticator,
) -> Result<CallerIdentity, ApiError> {
  let token = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .ok_or(ApiError::Unauthenticated)?;

  auth.authenticate(token).ok_or(ApiError::Unauthenticated)
}
