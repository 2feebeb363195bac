use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Everything a request can fail with, mapped one-to-one onto HTTP statuses.
///
/// The `kind` tag in the response envelope is the machine-readable dispatch
/// key; the message is supplementary context for humans. Clients must never
/// have to substring-match the message to classify an error.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing required data.")]
    MissingData,
    #[error("A license key is required.")]
    Unauthorized,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    ServerMisconfigured(String),
    #[error("{0}")]
    Transport(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingData => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::ServerMisconfigured(_) | ApiError::Transport(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::MissingData => "missing_data",
            ApiError::Unauthorized => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::ServerMisconfigured(_) => "server_misconfigured",
            ApiError::Transport(_) => "transport_error",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub kind: &'static str,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let envelope = ErrorEnvelope {
            success: false,
            kind: self.kind(),
            message: self.to_string(),
        };
        (self.status(), Json(envelope)).into_response()
    }
}
