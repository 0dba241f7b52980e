use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("invalid request data")]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    Conflict(String),
}

/// One entry of the field-level error list returned with a 400.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<FieldError>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            AppError::NotFound(what) => {
                (StatusCode::NOT_FOUND, format!("{what} not found"), Vec::new())
            }
            AppError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, "Invalid data".to_string(), errors)
            }
            AppError::Conflict(message) => (StatusCode::CONFLICT, message, Vec::new()),
            AppError::Database(err) => {
                error!("database error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    Vec::new(),
                )
            }
        };

        let body = Json(ErrorResponse { message, errors });
        (status, body).into_response()
    }
}
