//! JSON REST API for the Tether gadget registry.
//!
//! Exposes an axum [`Router`] backed by any
//! [`tether_core::store::RegistryStore`] and any
//! [`tether_core::auth::Authenticator`]. TLS and transport concerns are the
//! caller's responsibility.

pub mod auth;
pub mod error;
pub mod extract;
pub mod gadgets;
pub mod notifications;
pub mod reports;
pub mod transfer;
pub mod users;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use serde::Deserialize;
use tether_core::{Error as CoreError, auth::Authenticator, store::RegistryStore};
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use extract::ApiJson;

// ─── Configuration ────────────────────────────────────────────────────────────

/// One bearer-token entry in the static authenticator table.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenEntry {
  pub token:   String,
  pub user_id: uuid::Uuid,
  pub brn:     Option<String>,
  pub tin:     Option<String>,
}

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  pub host:        String,
  pub port:        u16,
  pub store_path:  PathBuf,
  /// Static bearer tokens accepted by the in-tree authenticator.
  #[serde(default)]
  pub auth_tokens: Vec<TokenEntry>,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub store: Arc<S>,
  pub auth:  Arc<dyn Authenticator>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store: self.store.clone(),
      auth:  self.auth.clone(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn router<S>(state: AppState<S>) -> Router<()>
where
  S: RegistryStore + 'static,
  S::Error: Into<CoreError>,
{
  Router::new()
    // Gadgets
    .route("/gadgets/register", post(gadgets::register::<S>))
    .route("/gadgets/view", get(gadgets::view::<S>))
    .route("/gadgets/view/{id}", get(gadgets::view_one::<S>))
    .route("/gadgets/search", get(gadgets::search::<S>))
    .route("/gadgets/{identifier}", get(gadgets::by_identifier::<S>))
    // Transfers
    .route("/transfer/piece", post(transfer::piece::<S>))
    .route("/transfer/batch", post(transfer::batch::<S>))
    // Reports
    .route("/reports/report", post(reports::file::<S>))
    .route("/reports", get(reports::list::<S>))
    // Notifications
    .route("/notifications", get(notifications::list::<S>))
    // Users
    .route("/users", post(users::create::<S>))
    .route("/users/me", get(users::me::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
