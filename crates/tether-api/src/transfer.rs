//! Handlers for `/transfer` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/transfer/piece` | One gadget, by id or IMEI/serial |
//! | `POST` | `/transfer/batch` | Itemised best-effort over a set of ids |

use axum::{Json, extract::State, http::HeaderMap};
use serde::Deserialize;
use tether_core::{
  Error as CoreError,
  gadget::Gadget,
  store::RegistryStore,
  transfer::{BatchOutcome, TransferService, TransferTarget},
  user::OwnerDesignator,
};
use uuid::Uuid;

use crate::{
  AppState, auth::require_caller, error::ApiError, extract::ApiJson,
};

// ─── Single ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /transfer/piece`. Exactly one of `gadget_id`
/// and `identifier` must be set; the recipient is named by BRN and/or TIN.
#[derive(Debug, Deserialize)]
pub struct PieceBody {
  pub gadget_id:     Option<Uuid>,
  /// IMEI or serial number, resolved to an id before the transfer runs.
  pub identifier:    Option<String>,
  pub new_owner_brn: Option<String>,
  pub new_owner_tin: Option<String>,
}

/// `POST /transfer/piece`
pub async fn piece<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
  ApiJson(body): ApiJson<PieceBody>,
) -> Result<Json<Gadget>, ApiError>
where
  S: RegistryStore,
  S::Error: Into<CoreError>,
{
  let caller = require_caller(&headers, state.auth.as_ref())?;

  let target = match (body.gadget_id, body.identifier) {
    (Some(id), None) => TransferTarget::Id(id),
    (None, Some(ident)) => TransferTarget::Identifier(ident),
    _ => {
      return Err(ApiError::BadRequest(
        "exactly one of gadget_id and identifier must be supplied".into(),
      ));
    }
  };

  let designator = OwnerDesignator::new(body.new_owner_brn, body.new_owner_tin)?;

  let gadget = TransferService::new(state.store.clone())
    .transfer_single(&caller, target, &designator)
    .await?;
  Ok(Json(gadget))
}

// ─── Batch ────────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /transfer/batch`.
#[derive(Debug, Deserialize)]
pub struct BatchBody {
  pub gadget_ids:    Vec<Uuid>,
  pub new_owner_brn: Option<String>,
  pub new_owner_tin: Option<String>,
}

/// `POST /transfer/batch` — returns the itemised [`BatchOutcome`].
pub async fn batch<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
  ApiJson(body): ApiJson<BatchBody>,
) -> Result<Json<BatchOutcome>, ApiError>
where
  S: RegistryStore,
  S::Error: Into<CoreError>,
{
  let caller = require_caller(&headers, state.auth.as_ref())?;

  if body.gadget_ids.is_empty() {
    return Err(ApiError::BadRequest("gadget_ids must not be empty".into()));
  }

  let designator = OwnerDesignator::new(body.new_owner_brn, body.new_owner_tin)?;

  let outcome = TransferService::new(state.store.clone())
    .transfer_batch(&caller, &body.gadget_ids, &designator)
    .await?;
  Ok(Json(outcome))
}
