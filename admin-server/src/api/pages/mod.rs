//! 页面路由 (JSON 页面模型)
//!
//! | 路径 | 说明 |
//! |------|------|
//! | / | 重定向到 /dashboard |
//! | /login | 登录页 (公共) |
//! | /unauthorized | 无权限提示 |
//! | /dashboard | 导航 = 当前角色可访问的 tab |
//! | /settings | 主题设置 |
//! | /{resource} | 表格页: 列、预加载的过滤选项、第一页数据 |

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::index))
        .route("/login", get(handler::login))
        .route("/unauthorized", get(handler::unauthorized))
        .route("/dashboard", get(handler::dashboard))
        .route("/settings", get(handler::settings))
        .route("/{resource}", get(handler::table))
}
