//! API error handling for consistent JSON error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::agenda::AgendaError;
use crate::controller::ControlError;
use crate::timing::TimingError;

/// API error type that converts to JSON responses.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": true,
            "message": self.message,
        }));
        (self.status, body).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(format!("{:#}", err))
    }
}

impl From<TimingError> for ApiError {
    fn from(err: TimingError) -> Self {
        match err {
            TimingError::InvalidTransition { .. } => Self::conflict(err.to_string()),
            TimingError::InvalidInput(_) => Self::bad_request(err.to_string()),
        }
    }
}

impl From<AgendaError> for ApiError {
    fn from(err: AgendaError) -> Self {
        match err {
            AgendaError::UnknownItem(_) => Self::not_found(err.to_string()),
            AgendaError::ItemLive(_) | AgendaError::ItemFinalized(_) => {
                Self::conflict(err.to_string())
            }
            AgendaError::Timing(inner) => inner.into(),
        }
    }
}

impl From<ControlError> for ApiError {
    fn from(err: ControlError) -> Self {
        match err {
            ControlError::Agenda(inner) => inner.into(),
            ControlError::Timing(inner) => inner.into(),
            ControlError::FocusBusy(_) => Self::conflict(err.to_string()),
            ControlError::UnknownSnapshot(_) => Self::not_found(err.to_string()),
            ControlError::Store(_) => Self::internal(err.to_string()),
        }
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;
