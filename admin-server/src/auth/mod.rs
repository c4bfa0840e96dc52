//! 认证授权模块
//!
//! - [`JwtService`] - 会话令牌服务
//! - [`SessionContext`] - 请求级会话上下文
//! - [`route_guard`] - 路由守卫中间件
//! - Cookie 读写见 [`session`]

pub mod guard;
pub mod jwt;
pub mod session;

pub use guard::{DASHBOARD_PATH, LOGIN_PATH, RouteClass, UNAUTHORIZED_PATH, classify, route_guard};
pub use jwt::{Claims, JwtConfig, JwtError, JwtService};
pub use session::SessionContext;
