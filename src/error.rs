use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::models::CoordinateError;

/// Failure reported by the weather forecast service
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum WeatherServiceError {
    #[error("Weather service timed out")]
    Timeout,

    #[error("Weather service returned status {status}")]
    Status { status: u16 },

    #[error("Weather service returned an unreadable response: {message}")]
    Malformed {
        status: Option<u16>,
        message: String,
    },

    #[error("Weather service request failed: {0}")]
    Request(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(#[from] CoordinateError),
}

impl WeatherServiceError {
    /// Upstream HTTP status, when the request got that far
    pub fn status_code(&self) -> Option<u16> {
        match self {
            WeatherServiceError::Status { status } => Some(*status),
            WeatherServiceError::Malformed { status, .. } => *status,
            _ => None,
        }
    }

    /// Timeouts can be retried by re-issuing the request; everything else is permanent
    pub fn is_timeout(&self) -> bool {
        matches!(self, WeatherServiceError::Timeout)
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            WeatherServiceError::Timeout
        } else if err.is_decode() {
            WeatherServiceError::Malformed {
                status: err.status().map(|s| s.as_u16()),
                message: err.to_string(),
            }
        } else {
            WeatherServiceError::Request(err.to_string())
        }
    }
}

/// Failure reported by the movie metadata service
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("Movie catalog error{}: {message}", status_suffix(.status))]
pub struct MovieCatalogError {
    pub status: Option<u16>,
    pub message: String,
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {s})")).unwrap_or_default()
}

impl MovieCatalogError {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    MovieCatalog(#[from] MovieCatalogError),

    #[error(transparent)]
    Weather(#[from] WeatherServiceError),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<CoordinateError> for AppError {
    fn from(err: CoordinateError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Weather(WeatherServiceError::InvalidCoordinates(e)) => {
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            AppError::Weather(WeatherServiceError::Timeout) => {
                (StatusCode::GATEWAY_TIMEOUT, self.to_string())
            }
            AppError::Weather(_) | AppError::MovieCatalog(_) | AppError::HttpClient(_) => {
                (StatusCode::BAD_GATEWAY, self.to_string())
            }
            AppError::Database(_) | AppError::Export(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
