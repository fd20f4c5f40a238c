//! Handlers for `/reports` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/reports/report` | File a lost/stolen report by IMEI/serial |
//! | `GET`  | `/reports` | All reports, newest first |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use tether_core::{
  Error as CoreError,
  report::{Report, ReportFields},
  store::RegistryStore,
  transfer::TransferService,
};

use crate::{AppState, error::ApiError, extract::ApiJson};

/// JSON body accepted by `POST /reports/report`.
#[derive(Debug, Deserialize)]
pub struct ReportBody {
  /// IMEI or serial number of the reported gadget.
  pub gadget_identifier: String,
  #[serde(flatten)]
  pub fields:            ReportFields,
}

/// `POST /reports/report` — 201 with the stored report.
///
/// Deliberately unauthenticated: a finder reporting someone else's device
/// has no account.
pub async fn file<S>(
  State(state): State<AppState<S>>,
  ApiJson(body): ApiJson<ReportBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RegistryStore,
  S::Error: Into<CoreError>,
{
  let report = TransferService::new(state.store.clone())
    .file_report(&body.gadget_identifier, body.fields)
    .await?;
  Ok((StatusCode::CREATED, Json(report)))
}

/// `GET /reports`
pub async fn list<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<Report>>, ApiError>
where
  S: RegistryStore,
  S::Error: Into<CoreError>,
{
  let reports = state
    .store
    .list_reports()
    .await
    .map_err(|e| ApiError::Core(e.into()))?;
  Ok(Json(reports))
}
