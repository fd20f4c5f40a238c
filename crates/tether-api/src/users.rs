//! Handlers for `/users` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/users` | Create an identity (no credentials) |
//! | `GET`  | `/users/me` | The authenticated caller's record |

use axum::{
  Json,
  extract::State,
  http::{HeaderMap, StatusCode},
  response::IntoResponse,
};
use tether_core::{
  Error as CoreError,
  store::RegistryStore,
  user::{NewUser, User},
};

use crate::{
  AppState, auth::require_caller, error::ApiError, extract::ApiJson,
};

/// `POST /users` — body: [`NewUser`]; at least one of `brn`/`tin` required.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  ApiJson(body): ApiJson<NewUser>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RegistryStore,
  S::Error: Into<CoreError>,
{
  let user = state
    .store
    .add_user(body)
    .await
    .map_err(|e| ApiError::Core(e.into()))?;
  Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /users/me`
pub async fn me<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
) -> Result<Json<User>, ApiError>
where
  S: RegistryStore,
  S::Error: Into<CoreError>,
{
  let caller = require_caller(&headers, state.auth.as_ref())?;

  let user = state
    .store
    .get_user(caller.user_id)
    .await
    .map_err(|e| ApiError::Core(e.into()))?
    .ok_or(ApiError::Core(CoreError::UserNotFound(caller.user_id)))?;
  Ok(Json(user))
}
