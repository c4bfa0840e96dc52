//! 控制台错误码
//!
//! 数值按类别分段 (见 [`super::ErrorCategory`])，浏览器端按数值判断:
//! - 0xxx: 通用
//! - 1xxx: 认证
//! - 2xxx: 权限
//! - 3xxx: 表格 / 查询
//! - 4xxx: 后端
//! - 9xxx: 系统

use serde::{Deserialize, Serialize};
use std::fmt;

/// 错误码，序列化为 u16
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: 通用 ====================
    Success = 0,
    ValidationFailed = 2,
    /// 后端报告记录冲突 (409)
    AlreadyExists = 4,

    // ==================== 1xxx: 认证 ====================
    NotAuthenticated = 1001,
    /// 后端拒绝了邮箱/密码
    InvalidCredentials = 1002,

    // ==================== 2xxx: 权限 ====================
    PermissionDenied = 2001,
    /// 令牌中没有可识别的角色
    RoleRequired = 2002,
    /// 操作 id 未在权限表中登记
    UnknownAction = 2004,

    // ==================== 3xxx: 表格 ====================
    TableNotFound = 3001,
    InvalidQuery = 3002,
    /// 列类型不支持该过滤运算符
    InvalidFilterOperator = 3003,
    RecordNotFound = 3004,

    // ==================== 4xxx: 后端 ====================
    /// 后端返回非成功状态
    UpstreamError = 4001,
    /// 后端连接失败
    UpstreamUnavailable = 4002,
    /// 后端响应信封格式错误
    UpstreamMalformed = 4003,

    // ==================== 9xxx: 系统 ====================
    InternalError = 9001,
    NetworkError = 9003,
    TimeoutError = 9004,
}

impl ErrorCode {
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// 默认提示 (英文，面向开发者)
    pub const fn message(&self) -> &'static str {
        match self {
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::AlreadyExists => "Record already exists",

            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid email or password",

            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::RoleRequired => "A valid role is required",
            ErrorCode::UnknownAction => "Action is not registered",

            ErrorCode::TableNotFound => "Table is not configured",
            ErrorCode::InvalidQuery => "Invalid table query",
            ErrorCode::InvalidFilterOperator => "Unsupported filter operator",
            ErrorCode::RecordNotFound => "Record not found",

            ErrorCode::UpstreamError => "Backend request failed",
            ErrorCode::UpstreamUnavailable => "Backend is unavailable",
            ErrorCode::UpstreamMalformed => "Backend returned a malformed response",

            ErrorCode::InternalError => "Internal server error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Backend request timed out",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// 无法识别的错误码数值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            0 => ErrorCode::Success,
            2 => ErrorCode::ValidationFailed,
            4 => ErrorCode::AlreadyExists,

            1001 => ErrorCode::NotAuthenticated,
            1002 => ErrorCode::InvalidCredentials,

            2001 => ErrorCode::PermissionDenied,
            2002 => ErrorCode::RoleRequired,
            2004 => ErrorCode::UnknownAction,

            3001 => ErrorCode::TableNotFound,
            3002 => ErrorCode::InvalidQuery,
            3003 => ErrorCode::InvalidFilterOperator,
            3004 => ErrorCode::RecordNotFound,

            4001 => ErrorCode::UpstreamError,
            4002 => ErrorCode::UpstreamUnavailable,
            4003 => ErrorCode::UpstreamMalformed,

            9001 => ErrorCode::InternalError,
            9003 => ErrorCode::NetworkError,
            9004 => ErrorCode::TimeoutError,

            _ => return Err(InvalidErrorCode(value)),
        };
        Ok(code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::PermissionDenied.code(), 2001);
        assert_eq!(ErrorCode::InvalidQuery.code(), 3002);
        assert_eq!(ErrorCode::UpstreamError.code(), 4001);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_try_from_rejects_unknown() {
        assert_eq!(ErrorCode::try_from(2004), Ok(ErrorCode::UnknownAction));
        assert_eq!(ErrorCode::try_from(2003), Err(InvalidErrorCode(2003)));
        assert_eq!(ErrorCode::try_from(4242), Err(InvalidErrorCode(4242)));
    }

    #[test]
    fn test_every_code_round_trips() {
        let all = [
            ErrorCode::Success,
            ErrorCode::ValidationFailed,
            ErrorCode::AlreadyExists,
            ErrorCode::NotAuthenticated,
            ErrorCode::InvalidCredentials,
            ErrorCode::PermissionDenied,
            ErrorCode::RoleRequired,
            ErrorCode::UnknownAction,
            ErrorCode::TableNotFound,
            ErrorCode::InvalidQuery,
            ErrorCode::InvalidFilterOperator,
            ErrorCode::RecordNotFound,
            ErrorCode::UpstreamError,
            ErrorCode::UpstreamUnavailable,
            ErrorCode::UpstreamMalformed,
            ErrorCode::InternalError,
            ErrorCode::NetworkError,
            ErrorCode::TimeoutError,
        ];
        for code in all {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_serde_as_number() {
        let json = serde_json::to_string(&ErrorCode::UpstreamMalformed).unwrap();
        assert_eq!(json, "4003");

        let code: ErrorCode = serde_json::from_str("1002").unwrap();
        assert_eq!(code, ErrorCode::InvalidCredentials);

        assert!(serde_json::from_str::<ErrorCode>("77").is_err());
    }
}
