//! Handlers for `/gadgets` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/gadgets/register` | Body: [`GadgetDraft`]; caller becomes owner |
//! | `GET`  | `/gadgets/view` | Summary projection of every gadget |
//! | `GET`  | `/gadgets/view/:id` | Full record, 404 if not found |
//! | `GET`  | `/gadgets/search?query=` | Caller's gadgets matching the query |
//! | `GET`  | `/gadgets/:identifier` | Exact IMEI or serial-number lookup |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::{HeaderMap, StatusCode},
  response::IntoResponse,
};
use serde::Deserialize;
use tether_core::{
  Error as CoreError,
  gadget::{Gadget, GadgetDraft, GadgetSummary},
  store::{GadgetQuery, RegistryStore},
};
use uuid::Uuid;

use crate::{
  AppState, auth::require_caller, error::ApiError, extract::ApiJson,
};

// ─── Register ─────────────────────────────────────────────────────────────────

/// `POST /gadgets/register` — validates the draft, persists, 201.
pub async fn register<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
  ApiJson(draft): ApiJson<GadgetDraft>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RegistryStore,
  S::Error: Into<CoreError>,
{
  let caller = require_caller(&headers, state.auth.as_ref())?;
  let input = draft.validate(caller.user_id)?;

  let gadget = state
    .store
    .add_gadget(input)
    .await
    .map_err(|e| ApiError::Core(e.into()))?;
  Ok((StatusCode::CREATED, Json(gadget)))
}

// ─── View ─────────────────────────────────────────────────────────────────────

/// `GET /gadgets/view`
pub async fn view<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
) -> Result<Json<Vec<GadgetSummary>>, ApiError>
where
  S: RegistryStore,
  S::Error: Into<CoreError>,
{
  require_caller(&headers, state.auth.as_ref())?;

  let gadgets = state
    .store
    .list_gadgets()
    .await
    .map_err(|e| ApiError::Core(e.into()))?;
  Ok(Json(gadgets.iter().map(Gadget::summary).collect()))
}

/// `GET /gadgets/view/:id`
pub async fn view_one<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
  Path(id): Path<Uuid>,
) -> Result<Json<Gadget>, ApiError>
where
  S: RegistryStore,
  S::Error: Into<CoreError>,
{
  require_caller(&headers, state.auth.as_ref())?;

  let gadget = state
    .store
    .get_gadget(id)
    .await
    .map_err(|e| ApiError::Core(e.into()))?
    .ok_or(ApiError::Core(CoreError::GadgetNotFound(id)))?;
  Ok(Json(gadget))
}

// ─── Search ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SearchParams {
  pub query:  String,
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

/// `GET /gadgets/search?query=<text>` — scoped to the caller's gadgets.
pub async fn search<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
  Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Gadget>>, ApiError>
where
  S: RegistryStore,
  S::Error: Into<CoreError>,
{
  let caller = require_caller(&headers, state.auth.as_ref())?;

  if params.query.trim().is_empty() {
    return Err(ApiError::BadRequest("query parameter is required".into()));
  }

  let gadgets = state
    .store
    .search_gadgets(&GadgetQuery {
      text:   params.query,
      owner:  Some(caller.user_id),
      limit:  params.limit,
      offset: params.offset,
    })
    .await
    .map_err(|e| ApiError::Core(e.into()))?;
  Ok(Json(gadgets))
}

// ─── Identifier lookup ────────────────────────────────────────────────────────

/// `GET /gadgets/:identifier` — exact IMEI or serial number.
pub async fn by_identifier<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
  Path(identifier): Path<String>,
) -> Result<Json<Gadget>, ApiError>
where
  S: RegistryStore,
  S::Error: Into<CoreError>,
{
  require_caller(&headers, state.auth.as_ref())?;

  let gadget = state
    .store
    .find_gadget_by_identifier(&identifier)
    .await
    .map_err(|e| ApiError::Core(e.into()))?
    .ok_or_else(|| ApiError::Core(CoreError::UnknownIdentifier(identifier)))?;
  Ok(Json(gadget))
}
