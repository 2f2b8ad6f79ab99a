//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error body is `{"message": "..."}`. Messages never say more than the
//! status code already does about whether a resource exists.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use weft_core::ValidationError;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("authentication required")]
  Unauthenticated,

  #[error("{0}")]
  Forbidden(String),

  #[error("invalid payload: {0}")]
  Validation(ValidationError),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("not found")]
  NotFound,

  #[error("precondition failed")]
  PreconditionFailed,

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    ApiError::Store(Box::new(e))
  }
}

impl From<weft_core::Error> for ApiError {
  fn from(e: weft_core::Error) -> Self {
    match e {
      weft_core::Error::Unauthenticated => ApiError::Unauthenticated,
      weft_core::Error::Forbidden(m) => ApiError::Forbidden(m),
      weft_core::Error::Validation(v) => ApiError::Validation(v),
      weft_core::Error::NotFound => ApiError::NotFound,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, body) = match &self {
      ApiError::Unauthenticated => (
        StatusCode::UNAUTHORIZED,
        json!({ "message": "authentication required" }),
      ),
      ApiError::Forbidden(m) => (StatusCode::FORBIDDEN, json!({ "message": m })),
      ApiError::Validation(v) => (
        StatusCode::BAD_REQUEST,
        json!({ "message": v.to_string(), "errors": v.errors }),
      ),
      ApiError::BadRequest(m) => {
        (StatusCode::BAD_REQUEST, json!({ "message": m }))
      }
      ApiError::NotFound => {
        (StatusCode::NOT_FOUND, json!({ "message": "resource not found" }))
      }
      ApiError::PreconditionFailed => (
        StatusCode::PRECONDITION_FAILED,
        json!({ "message": "resource has changed since it was read" }),
      ),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          json!({ "message": "internal error" }),
        )
      }
    };

    let mut res = (status, Json(body)).into_response();
    if status == StatusCode::UNAUTHORIZED {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Bearer realm=\"weft\""),
      );
    }
    res
  }
}
