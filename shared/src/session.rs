//! 会话相关类型与 Cookie 约定
//!
//! 三个 Cookie 的分工:
//!
//! | Cookie | HttpOnly | 用途 |
//! |--------|----------|------|
//! | `token` | 是 | 签名会话令牌，授权的唯一依据 |
//! | `userRole` | 是 | 角色缓存，仅用于显示 |
//! | `user` | 否 | 用户资料 JSON，供浏览器端显示 |

use serde::{Deserialize, Serialize};

use crate::rbac::Role;

pub const TOKEN_COOKIE: &str = "token";
pub const ROLE_COOKIE: &str = "userRole";
pub const USER_COOKIE: &str = "user";

/// 会话有效期: 7 天
pub const SESSION_MAX_AGE_SECS: i64 = 7 * 24 * 60 * 60;

/// 用户资料
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
    /// 后端给出的角色字符串，可能不是合法角色
    pub role: String,
}

impl UserProfile {
    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }
}

/// 登录请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// 后端 `/auth/login` 返回的数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendLoginData {
    #[serde(default)]
    pub token: Option<String>,
    pub user: UserProfile,
}

/// 控制台登录响应 (令牌只放在 HttpOnly Cookie 中)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: UserProfile,
    pub redirect_to: String,
}

/// 当前会话
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentSessionResponse {
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub role: Option<Role>,
    pub expires_in_secs: i64,
}
