use axum::{http::StatusCode, response::IntoResponse};
use thiserror::Error;

use crate::payload::PayloadError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid window: start {start} is after end {end}")]
    InvalidWindow {
        start: chrono::NaiveDateTime,
        end: chrono::NaiveDateTime,
    },

    #[error("Date {0} cannot be represented as a window bound")]
    DateOutOfRange(chrono::NaiveDate),

    #[error("No window given and no transactions to span one")]
    MissingWindow,

    #[error("Payload error: {0}")]
    Payload(#[from] PayloadError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Analysis task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::InvalidWindow { .. }
            | AppError::DateOutOfRange(_)
            | AppError::MissingWindow => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}
