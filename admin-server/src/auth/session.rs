//! 会话上下文与 Cookie
//!
//! 会话只在登录/登出时写入 Cookie。`userRole` 与 `user` 仅供显示，
//! 授权总是以令牌中的角色声明为准。

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use http::HeaderValue;
use http::header::{COOKIE, HeaderMap};
use shared::error::{AppError, AppResult};
use shared::rbac::Role;
use shared::session::{ROLE_COOKIE, SESSION_MAX_AGE_SECS, TOKEN_COOKIE, USER_COOKIE, UserProfile};

use super::Claims;

/// 请求级会话上下文
///
/// 由路由守卫在令牌有效时插入请求扩展，处理函数通过提取器获取。
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub user_id: String,
    pub email: String,
    pub name: String,
    /// 令牌中的角色; 未知角色为 `None`
    pub role: Option<Role>,
    /// 转发给后端的令牌
    pub backend_token: Option<String>,
    pub expires_in_secs: i64,
}

impl SessionContext {
    pub fn from_claims(claims: Claims, expires_in_secs: i64) -> Self {
        let role = claims.role();
        Self {
            user_id: claims.sub,
            email: claims.email,
            name: claims.name,
            role,
            backend_token: claims.backend_token,
            expires_in_secs,
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for SessionContext {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionContext>()
            .cloned()
            .ok_or_else(AppError::unauthorized)
    }
}

/// 读取请求中的 Cookie 值 (空值视为不存在)
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"'))
        .filter(|value| !value.is_empty())
}

fn build_cookie(name: &str, value: &str, max_age: i64, http_only: bool, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; Max-Age={}; SameSite=Strict",
        name, value, max_age
    );
    if http_only {
        cookie.push_str("; HttpOnly");
    }
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `user` Cookie 的值: 用户资料 JSON 的 URL-safe base64
pub fn encode_user_cookie(user: &UserProfile) -> AppResult<String> {
    let json = serde_json::to_vec(user)
        .map_err(|e| AppError::internal(format!("Failed to encode user cookie: {}", e)))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

pub fn decode_user_cookie(value: &str) -> Option<UserProfile> {
    let bytes = URL_SAFE_NO_PAD.decode(value).ok()?;
    serde_json::from_slice(&bytes).ok()
}

fn header_value(cookie: String) -> AppResult<HeaderValue> {
    HeaderValue::from_str(&cookie)
        .map_err(|e| AppError::internal(format!("Invalid cookie value: {}", e)))
}

/// 登录成功后写入的三个 Cookie
pub fn session_cookies(token: &str, user: &UserProfile, secure: bool) -> AppResult<Vec<HeaderValue>> {
    let role = user.role().map(|r| r.as_str()).unwrap_or_default();
    let user_value = encode_user_cookie(user)?;

    [
        build_cookie(TOKEN_COOKIE, token, SESSION_MAX_AGE_SECS, true, secure),
        build_cookie(ROLE_COOKIE, role, SESSION_MAX_AGE_SECS, true, secure),
        build_cookie(USER_COOKIE, &user_value, SESSION_MAX_AGE_SECS, false, secure),
    ]
    .into_iter()
    .map(header_value)
    .collect()
}

/// 登出时使三个 Cookie 立即过期
pub fn clear_session_cookies(secure: bool) -> Vec<HeaderValue> {
    [
        (TOKEN_COOKIE, true),
        (ROLE_COOKIE, true),
        (USER_COOKIE, false),
    ]
    .into_iter()
    .filter_map(|(name, http_only)| {
        HeaderValue::from_str(&build_cookie(name, "", 0, http_only, secure)).ok()
    })
    .collect()
}
