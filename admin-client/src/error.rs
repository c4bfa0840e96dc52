//! Client error types

use serde_json::Value;
use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Non-success response from the backend
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct FetchError {
    /// Backend error code, or `HTTP_<status>` when the body carried none
    pub code: String,
    pub message: String,
    pub status_code: u16,
    pub details: Option<Value>,
}

impl FetchError {
    /// Literal "not found": HTTP 404 or backend code `NOT_FOUND`
    pub fn is_not_found(&self) -> bool {
        self.status_code == 404 || self.code.eq_ignore_ascii_case("NOT_FOUND")
    }
}

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with an error
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Fetch(e) if e.is_not_found())
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Fetch(e) => {
                let app = match e.status_code {
                    400 | 422 => AppError::validation(e.message.clone()),
                    401 => AppError::with_message(ErrorCode::NotAuthenticated, e.message.clone()),
                    403 => AppError::permission_denied(e.message.clone()),
                    404 => AppError::with_message(ErrorCode::RecordNotFound, e.message.clone()),
                    409 => AppError::with_message(ErrorCode::AlreadyExists, e.message.clone()),
                    status => AppError::upstream(status, e.message.clone()),
                };
                let app = app.with_detail("backend_code", e.code);
                match e.details {
                    Some(details) => app.with_detail("backend_details", details),
                    None => app,
                }
            }
            ClientError::Http(e) if e.is_timeout() => {
                AppError::with_message(ErrorCode::TimeoutError, e.to_string())
            }
            ClientError::Http(e) if e.is_connect() => {
                AppError::with_message(ErrorCode::UpstreamUnavailable, e.to_string())
            }
            ClientError::Http(e) => AppError::with_message(ErrorCode::NetworkError, e.to_string()),
            ClientError::InvalidResponse(msg) => {
                AppError::with_message(ErrorCode::UpstreamMalformed, msg)
            }
            ClientError::Serialization(e) => {
                AppError::with_message(ErrorCode::UpstreamMalformed, e.to_string())
            }
        }
    }
}
