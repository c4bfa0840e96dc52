//! 路由守卫中间件
//!
//! 在所有处理函数之前运行:
//!
//! 1. 内部资源 (`/_static/`, `/favicon.ico`, `/health`) 直接放行
//! 2. 读取 `token` Cookie 并验证
//! 3. 公共路由: 已登录访问页面时重定向到 `/dashboard`
//! 4. 受保护路由: 未登录时页面重定向到 `/login`，API 返回 401
//! 5. 路由第一段在权限表中登记且角色不允许时重定向到 `/unauthorized`
//! 6. 放行，并把 [`SessionContext`] 注入请求扩展
//!
//! 缺失、格式错误、过期的令牌都按未登录处理，从不返回 500。

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use http::HeaderMap;
use shared::error::AppError;
use shared::rbac::{Role, route_key};
use shared::session::{ROLE_COOKIE, TOKEN_COOKIE};

use super::session::{SessionContext, read_cookie};
use super::JwtError;
use crate::core::ServerState;
use crate::security_log;

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";

/// 无需登录的路由前缀
const PUBLIC_PREFIXES: &[&str] = &[
    "/login",
    "/signup",
    "/forgot-password",
    "/reset-password",
    "/api/auth/login",
];

/// 不经过守卫的内部资源
const INTERNAL_PREFIXES: &[&str] = &["/_static/", "/favicon.ico", "/health"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Internal,
    Public,
    Protected,
}

fn matches_prefix(path: &str, prefix: &str) -> bool {
    if prefix.ends_with('/') {
        return path.starts_with(prefix);
    }
    // `/login` 匹配 `/login` 与 `/login/...`，不匹配 `/loginx`
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// 路径分类
pub fn classify(path: &str) -> RouteClass {
    if INTERNAL_PREFIXES.iter().any(|p| matches_prefix(path, p)) {
        RouteClass::Internal
    } else if PUBLIC_PREFIXES.iter().any(|p| matches_prefix(path, p)) {
        RouteClass::Public
    } else {
        RouteClass::Protected
    }
}

fn is_api(path: &str) -> bool {
    matches_prefix(path, "/api")
}

/// 从 Cookie 中恢复会话; 任何失败都返回 `None`
pub fn authenticate(state: &ServerState, headers: &HeaderMap, path: &str) -> Option<SessionContext> {
    let token = read_cookie(headers, TOKEN_COOKIE)?;
    let jwt_service = state.get_jwt_service();

    match jwt_service.validate_token(token) {
        Ok(claims) => {
            let expires_in = jwt_service.get_expiration_seconds(&claims);
            let session = SessionContext::from_claims(claims, expires_in);

            // userRole Cookie 只是显示缓存，与令牌不一致时以令牌为准
            if let Some(cookie_role) = read_cookie(headers, ROLE_COOKIE)
                && Role::parse(cookie_role) != session.role
            {
                security_log!(
                    "WARN",
                    "role_cookie_mismatch",
                    user_id = session.user_id.clone(),
                    cookie_role = cookie_role.to_string(),
                    token_role = session.role.map(|r| r.as_str()).unwrap_or("none"),
                    path = path.to_string()
                );
            }

            Some(session)
        }
        Err(e) => {
            let event = match e {
                JwtError::ExpiredToken => "token_expired",
                _ => "token_invalid",
            };
            security_log!(
                "WARN",
                event,
                error = format!("{}", e),
                path = path.to_string()
            );
            None
        }
    }
}

/// 路由守卫
pub async fn route_guard(State(state): State<ServerState>, mut req: Request, next: Next) -> Response {
    // 允许 CORS 预检的 OPTIONS 请求
    if req.method() == http::Method::OPTIONS {
        return next.run(req).await;
    }

    let path = req.uri().path().to_string();
    let class = classify(&path);
    if class == RouteClass::Internal {
        return next.run(req).await;
    }

    let session = authenticate(&state, req.headers(), &path);

    match (class, session) {
        (RouteClass::Public, Some(_)) if !is_api(&path) => Redirect::to(DASHBOARD_PATH).into_response(),
        (RouteClass::Public, session) => {
            if let Some(session) = session {
                req.extensions_mut().insert(session);
            }
            next.run(req).await
        }
        (_, None) => {
            security_log!("WARN", "auth_missing", path = path.clone());
            if is_api(&path) {
                AppError::unauthorized().into_response()
            } else {
                Redirect::to(LOGIN_PATH).into_response()
            }
        }
        (_, Some(session)) => {
            let key = route_key(&path);
            if let Some(allowed) = state.registry.route_roles(key)
                && !session.role.is_some_and(|role| allowed.contains(&role))
            {
                security_log!(
                    "WARN",
                    "route_forbidden",
                    user_id = session.user_id.clone(),
                    role = session.role.map(|r| r.as_str()).unwrap_or("none"),
                    path = path.clone()
                );
                return Redirect::to(UNAUTHORIZED_PATH).into_response();
            }

            req.extensions_mut().insert(session);
            next.run(req).await
        }
    }
}
