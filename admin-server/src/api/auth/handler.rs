//! Authentication Handlers
//!
//! Login is verified by the backend; the console then issues its own
//! session token and sets the session cookies.

use admin_client::ClientError;
use axum::Json;
use axum::extract::State;
use axum::response::{AppendHeaders, IntoResponse, Response};
use http::header::SET_COOKIE;
use shared::error::{ApiResponse, AppError};
use shared::session::{CurrentSessionResponse, LoginRequest, LoginResponse};

use crate::auth::session::{clear_session_cookies, session_cookies};
use crate::auth::{DASHBOARD_PATH, SessionContext};
use crate::core::ServerState;
use crate::security_log;

/// Login handler
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, AppError> {
    let email = req.email.trim().to_string();
    if email.is_empty() || req.password.is_empty() {
        return Err(AppError::validation("Email and password are required"));
    }

    let data = match state.backend().login(&email, &req.password).await {
        Ok(data) => data,
        Err(ClientError::Fetch(e)) if matches!(e.status_code, 400 | 401 | 403 | 404) => {
            security_log!(
                "WARN",
                "login_failed",
                email = email.clone(),
                status = e.status_code
            );
            return Err(AppError::invalid_credentials());
        }
        Err(e) => return Err(e.into()),
    };

    let user = data.user;
    if user.role().is_none() {
        // 未知角色仍可登录，但所有受保护路由都会被拒绝
        tracing::warn!(user_id = %user.id, role = %user.role, "User has unrecognized role");
    }

    let token = state
        .get_jwt_service()
        .generate_token(&user, data.token.as_deref())
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    let cookies = session_cookies(&token, &user, state.config.secure_cookies())?;

    tracing::info!(user_id = %user.id, email = %user.email, role = %user.role, "User logged in");

    let body = ApiResponse::success(LoginResponse {
        user,
        redirect_to: DASHBOARD_PATH.to_string(),
    });
    let headers: Vec<_> = cookies.into_iter().map(|c| (SET_COOKIE, c)).collect();

    Ok((AppendHeaders(headers), body).into_response())
}

/// Get current session info
pub async fn me(session: SessionContext) -> Json<ApiResponse<CurrentSessionResponse>> {
    Json(ApiResponse::success(CurrentSessionResponse {
        user_id: session.user_id,
        email: session.email,
        name: session.name,
        role: session.role,
        expires_in_secs: session.expires_in_secs,
    }))
}

/// Logout handler
pub async fn logout(State(state): State<ServerState>, session: SessionContext) -> Response {
    tracing::info!(user_id = %session.user_id, "User logged out");

    let headers: Vec<_> = clear_session_cookies(state.config.secure_cookies())
        .into_iter()
        .map(|c| (SET_COOKIE, c))
        .collect();

    (AppendHeaders(headers), ApiResponse::ok()).into_response()
}
