//! Response/error types for the config server.

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use rate_alert::EngineError;
use serde::Serialize;

/// Structured error body, same shape as the engine's error lines.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
  pub error: bool,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub field: Option<String>,
}

#[derive(Debug)]
pub enum ApiError {
  NotFound(String),
  BadRequest {
    message: String,
    field: Option<String>,
  },
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      Self::NotFound(_) => StatusCode::NOT_FOUND,
      Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
    }
  }
}

impl From<EngineError> for ApiError {
  fn from(err: EngineError) -> Self {
    let field = match &err {
      EngineError::Validation { field, .. } => Some(field.clone()),
      _ => None,
    };
    Self::BadRequest {
      message: err.to_string(),
      field,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let body = match self {
      Self::NotFound(message) => ErrorBody {
        error: true,
        message,
        field: None,
      },
      Self::BadRequest { message, field } => ErrorBody {
        error: true,
        message,
        field,
      },
    };
    (status, Json(body)).into_response()
  }
}
