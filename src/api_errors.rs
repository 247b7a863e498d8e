use crate::errors::ForecastError;
use crate::presenter::{FEATURE_ORDER_HINT, MISSING_MODEL_HINT};
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{message}")]
    Unprocessable { message: String, hint: String },
    #[error("{message}")]
    ServiceUnavailable { message: String, hint: String },
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unprocessable { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.status();
        let body = match self {
            AppError::BadRequest(error) | AppError::Internal(error) => ErrBody { error, hint: None },
            AppError::Unprocessable { message, hint }
            | AppError::ServiceUnavailable { message, hint } => ErrBody {
                error: message,
                hint: Some(hint),
            },
        };
        (code, Json(body)).into_response()
    }
}

impl From<ForecastError> for AppError {
    fn from(err: ForecastError) -> Self {
        match err {
            ForecastError::InvalidInput { .. } => AppError::BadRequest(err.to_string()),
            ForecastError::ModelUnavailable { .. } => AppError::ServiceUnavailable {
                message: err.to_string(),
                hint: MISSING_MODEL_HINT.to_string(),
            },
            ForecastError::InferenceFailure { message } => AppError::Unprocessable {
                message: format!("Error during prediction: {message}"),
                hint: FEATURE_ORDER_HINT.to_string(),
            },
            ForecastError::Config { .. } | ForecastError::Io { .. } => {
                AppError::Internal(err.to_string())
            }
        }
    }
}

/// Malformed or mistyped JSON bodies are reported as bad requests.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}
