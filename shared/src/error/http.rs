//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// 错误码对应的 HTTP 状态
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            Self::TableNotFound | Self::RecordNotFound => StatusCode::NOT_FOUND,

            Self::AlreadyExists => StatusCode::CONFLICT,

            Self::NotAuthenticated | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,

            Self::PermissionDenied | Self::RoleRequired | Self::UnknownAction => {
                StatusCode::FORBIDDEN
            }

            // 后端返回错误或格式异常
            Self::UpstreamError | Self::UpstreamMalformed => StatusCode::BAD_GATEWAY,

            // 瞬时错误，客户端可重试
            Self::UpstreamUnavailable | Self::NetworkError | Self::TimeoutError => {
                StatusCode::SERVICE_UNAVAILABLE
            }

            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,

            Self::ValidationFailed | Self::InvalidQuery | Self::InvalidFilterOperator => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}
