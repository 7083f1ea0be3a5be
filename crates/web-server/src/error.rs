use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pipeline::{BuildError, PipelineError, ValidationError};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("Malformed query string: {0}")]
    MalformedQuery(String),
    #[error("{0}")]
    EmptyResult(String),
    #[error("Database error: {0}")]
    Database(#[from] database::DbError),
    #[error("Query build error: {0}")]
    Build(#[from] BuildError),
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Validation(e) => AppError::Validation(e),
            PipelineError::Build(e) => AppError::Build(e),
        }
    }
}

/// Converts our custom `AppError` into an HTTP response.
///
/// Every validation failure is a 400, an empty result is a 404, and anything
/// that went wrong on our side is a 500 whose details only go to the log.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Validation(validation_err) => {
                tracing::warn!(error = %validation_err, "Rejected request parameters.");
                (StatusCode::BAD_REQUEST, validation_err.to_string())
            }
            AppError::MalformedQuery(message) => {
                tracing::warn!(error = %message, "Rejected query string.");
                (StatusCode::BAD_REQUEST, format!("Malformed query string: {}", message))
            }
            AppError::EmptyResult(message) => {
                tracing::info!(%message, "Query returned no rows.");
                (StatusCode::NOT_FOUND, message)
            }
            AppError::Database(db_err) => {
                tracing::error!(error = ?db_err, "Database error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal database error occurred".to_string(),
                )
            }
            AppError::Build(build_err) => {
                tracing::error!(error = ?build_err, "Query template and schema disagree.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred while building the query".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
