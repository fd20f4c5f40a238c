//! Handler for `/notifications`.

use axum::{Json, extract::State, http::HeaderMap};
use tether_core::{
  Error as CoreError, notification::Notification, store::RegistryStore,
};

use crate::{AppState, auth::require_caller, error::ApiError};

/// `GET /notifications` — the caller's notifications, newest first.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
) -> Result<Json<Vec<Notification>>, ApiError>
where
  S: RegistryStore,
  S::Error: Into<CoreError>,
{
  let caller = require_caller(&headers, state.auth.as_ref())?;

  let notifications = state
    .store
    .notifications_for_user(caller.user_id)
    .await
    .map_err(|e| ApiError::Core(e.into()))?;
  Ok(Json(notifications))
}
