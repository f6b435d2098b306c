use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

use crate::models::candidate::BlockingCandidate;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Campaign still has {} candidate(s) in the pipeline", .0.len())]
    PipelineNotEmpty(Vec<BlockingCandidate>),

    #[error("Conflict on {field}: {message}")]
    Conflict { field: String, message: String },

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Excel export error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

impl Error {
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        Error::NotFound(format!("{} {} not found", entity, id))
    }

    pub fn conflict(field: &str, message: impl Into<String>) -> Self {
        Error::Conflict {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            Error::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, json!({ "error": msg })),
            Error::Forbidden(msg) => (StatusCode::FORBIDDEN, json!({ "error": msg })),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            Error::InvalidTransition(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            Error::PipelineNotEmpty(blocking) => (
                StatusCode::CONFLICT,
                json!({
                    "error": format!(
                        "Campaign cannot be completed while {} candidate(s) are in the pipeline",
                        blocking.len()
                    ),
                    "blocking_candidates": blocking,
                }),
            ),
            Error::Conflict { field, message } => (
                StatusCode::CONFLICT,
                json!({ "error": message, "field": field }),
            ),
            Error::Validation(err) => (StatusCode::BAD_REQUEST, json!({ "error": err.to_string() })),
            Error::Json(err) => (StatusCode::BAD_REQUEST, json!({ "error": err.to_string() })),
            Error::Csv(err) => (StatusCode::BAD_REQUEST, json!({ "error": err.to_string() })),
            Error::Database(err) => {
                tracing::error!(error = %err, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Database error" }),
                )
            }
            Error::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": msg })),
            Error::Io(err) => (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": err.to_string() })),
            Error::Xlsx(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": format!("Export error: {}", err) }),
            ),
            Error::Anyhow(err) => (StatusCode::BAD_REQUEST, json!({ "error": err.to_string() })),
            Error::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "An unexpected error occurred" }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            other => Error::Database(other),
        }
    }
}
