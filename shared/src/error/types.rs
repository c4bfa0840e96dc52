//! 错误类型与统一响应
//!
//! 处理函数返回 `AppResult<T>`，错误经 [`IntoResponse`](axum::response::IntoResponse)
//! 转成 `{code, message, details}` JSON，HTTP 状态由错误码决定。

use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// 请求级错误
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    /// 可直接展示的提示
    pub message: String,
    /// 附加上下文 (字段名、后端错误码等)
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// 使用错误码的默认提示
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
        }
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    // ==================== 常用构造 ====================

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::PermissionDenied, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }

    /// 缺少或无效的会话
    pub fn unauthorized() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    pub fn invalid_credentials() -> Self {
        Self::new(ErrorCode::InvalidCredentials)
    }

    pub fn invalid_query(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InvalidQuery, msg)
    }

    /// 后端非成功响应，保留原始状态码
    pub fn upstream(status_code: u16, msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::UpstreamError, msg).with_detail("status_code", status_code)
    }
}

/// 统一响应体
///
/// 成功时 `code = 0` 且带 `data`，失败时带错误码与 `details`。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: Some(0),
            message: "OK".to_string(),
            data: Some(data),
            details: None,
        }
    }
}

impl ApiResponse<()> {
    /// 无数据的成功响应
    pub fn ok() -> Self {
        Self {
            code: Some(0),
            message: "OK".to_string(),
            data: None,
            details: None,
        }
    }

    pub fn error(err: &AppError) -> Self {
        Self {
            code: Some(err.code.code()),
            message: err.message.clone(),
            data: None,
            details: err.details.clone(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

// ===== axum 集成 =====

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        let status = self.http_status();
        let body = ApiResponse::<()>::error(&self);

        // 只记录系统与后端错误，客户端错误不记
        match self.code.category() {
            super::category::ErrorCategory::System => {
                tracing::error!(
                    code = %self.code,
                    message = %self.message,
                    "System error occurred"
                );
            }
            super::category::ErrorCategory::Upstream => {
                tracing::warn!(
                    code = %self.code,
                    message = %self.message,
                    "Upstream error occurred"
                );
            }
            _ => {}
        }

        (status, Json(body)).into_response()
    }
}

impl<T: Serialize> axum::response::IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        use super::codes::ErrorCode;
        use axum::Json;

        let status = match self.code {
            None | Some(0) => http::StatusCode::OK,
            Some(code) => ErrorCode::try_from(code)
                .map(|c| c.http_status())
                .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR),
        };

        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_new() {
        let err = AppError::new(ErrorCode::RecordNotFound);
        assert_eq!(err.code, ErrorCode::RecordNotFound);
        assert_eq!(err.message, "Record not found");
        assert!(err.details.is_none());
    }

    #[test]
    fn test_app_error_with_detail() {
        let err = AppError::validation("Missing required fields")
            .with_detail("field", "symbol")
            .with_detail("reason", "required");

        assert_eq!(err.code, ErrorCode::ValidationFailed);
        let details = err.details.unwrap();
        assert_eq!(details.get("field").unwrap(), "symbol");
        assert_eq!(details.get("reason").unwrap(), "required");
    }

    #[test]
    fn test_app_error_convenience_constructors() {
        let err = AppError::unauthorized();
        assert_eq!(err.code, ErrorCode::NotAuthenticated);
        assert_eq!(err.http_status(), StatusCode::UNAUTHORIZED);

        let err = AppError::permission_denied("Admins only");
        assert_eq!(err.code, ErrorCode::PermissionDenied);
        assert_eq!(err.http_status(), StatusCode::FORBIDDEN);

        let err = AppError::upstream(500, "boom");
        assert_eq!(err.code, ErrorCode::UpstreamError);
        assert_eq!(err.details.unwrap().get("status_code").unwrap(), 500);
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::with_message(ErrorCode::RecordNotFound, "Trade 7 not found");
        assert_eq!(format!("{}", err), "Trade 7 not found");
    }

    #[test]
    fn test_api_response_error() {
        let err = AppError::with_message(ErrorCode::RecordNotFound, "User not found")
            .with_detail("id", "123");
        let response = ApiResponse::<()>::error(&err);

        assert_eq!(response.code, Some(3004));
        assert_eq!(response.message, "User not found");
        assert!(response.data.is_none());
        assert!(response.details.is_some());
    }

    #[test]
    fn test_api_response_serialize() {
        let response = ApiResponse::success("hello");
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"code\":0"));
        assert!(json.contains("\"message\":\"OK\""));
        assert!(json.contains("\"data\":\"hello\""));
    }
}
