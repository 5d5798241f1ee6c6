//! Error type for the HTTP API.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use thiserror::Error;

use crate::quiz::{Diagnostic, Severity};

#[derive(Debug, Error)]
pub enum ApiError {
  /// Unknown lesson id.
  #[error("Lesson not found: {0}")]
  LessonNotFound(String),

  /// Lesson content has error-level diagnostics.
  #[error("Lesson has {} invalid question(s)", .0.iter().filter(|d| d.severity == Severity::Error).count())]
  InvalidLesson(Vec<Diagnostic>),

  /// Request is well-formed JSON but unusable.
  #[error("Bad request: {0}")]
  BadRequest(String),
}

impl ApiError {
  fn status(&self) -> StatusCode {
    match self {
      ApiError::LessonNotFound(_) => StatusCode::NOT_FOUND,
      ApiError::InvalidLesson(_) => StatusCode::UNPROCESSABLE_ENTITY,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let message = self.to_string();
    let body = match self {
      ApiError::InvalidLesson(diagnostics) => serde_json::json!({ "error": message, "diagnostics": diagnostics }),
      _ => serde_json::json!({ "error": message }),
    };
    (status, Json(body)).into_response()
  }
}

pub type ApiResult<T> = Result<T, ApiError>;
