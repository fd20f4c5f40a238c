//! Request extractors whose rejections speak the API's error dialect.

use axum::{
  Json,
  extract::{FromRequest, Request, rejection::JsonRejection},
};

use crate::ApiError;

/// [`axum::Json`] with rejections mapped into [`ApiError::BadRequest`], so a
/// malformed or incomplete body comes back as a 400 JSON error like every
/// other invalid input instead of axum's default 415/422 responses.
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
  Json<T>: FromRequest<S, Rejection = JsonRejection>,
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request(
    req: Request,
    state: &S,
  ) -> Result<Self, Self::Rejection> {
    match Json::<T>::from_request(req, state).await {
      Ok(Json(value)) => Ok(Self(value)),
      Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
    }
  }
}
