//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use tether_core::Error as CoreError;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthenticated")]
  Unauthenticated,

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Core(#[from] CoreError),
}

impl ApiError {
  fn status(&self) -> StatusCode {
    match self {
      Self::Unauthenticated => StatusCode::UNAUTHORIZED,
      Self::BadRequest(_) => StatusCode::BAD_REQUEST,
      Self::Core(core) => match core {
        CoreError::Validation(_)
        | CoreError::SelfTransfer { .. }
        | CoreError::MissingDesignator
        | CoreError::Serialization(_) => StatusCode::BAD_REQUEST,
        CoreError::GadgetNotFound(_)
        | CoreError::UnknownIdentifier(_)
        | CoreError::UserNotFound(_)
        | CoreError::OwnerNotFound { .. } => StatusCode::NOT_FOUND,
        CoreError::NotOwner { .. } => StatusCode::FORBIDDEN,
        CoreError::DuplicateSerial(_)
        | CoreError::DuplicateImei(_)
        | CoreError::DuplicateEmail(_)
        | CoreError::DuplicateDesignator(_) => StatusCode::CONFLICT,
        CoreError::RefSetMismatch { .. } | CoreError::Store(_) => {
          StatusCode::INTERNAL_SERVER_ERROR
        }
      },
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();

    if status == StatusCode::INTERNAL_SERVER_ERROR {
      tracing::error!(error = %self, "request failed");
    }

    // Field-level violations travel alongside the message so clients can
    // highlight the offending form fields.
    let body = match &self {
      Self::Core(CoreError::Validation(violations)) => json!({
        "error": self.to_string(),
        "violations": violations,
      }),
      _ => json!({ "error": self.to_string() }),
    };

    (status, Json(body)).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use uuid::Uuid;

  #[test]
  fn status_mapping_follows_the_taxonomy() {
    assert_eq!(ApiError::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
      ApiError::Core(CoreError::GadgetNotFound(Uuid::new_v4())).status(),
      StatusCode::NOT_FOUND
    );
    assert_eq!(
      ApiError::Core(CoreError::NotOwner {
        gadget: Uuid::new_v4(),
        caller: Uuid::new_v4(),
      })
      .status(),
      StatusCode::FORBIDDEN
    );
    assert_eq!(
      ApiError::Core(CoreError::DuplicateSerial("SN1".into())).status(),
      StatusCode::CONFLICT
    );
    assert_eq!(
      ApiError::Core(CoreError::DuplicateDesignator("BRN-1".into())).status(),
      StatusCode::CONFLICT
    );
    assert_eq!(
      ApiError::Core(CoreError::Validation(vec![])).status(),
      StatusCode::BAD_REQUEST
    );
  }
}
