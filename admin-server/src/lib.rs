//! Admin Server - 交易平台管理控制台
//!
//! # 架构概述
//!
//! 基于 axum 的服务端控制台，位于后端 REST API 之前：
//!
//! - **认证** (`auth`): 会话令牌、Cookie、路由守卫
//! - **表格目录** (`catalog`): 各资源的列、搜索字段、种子记录
//! - **HTTP API** (`api`): 页面模型、表格 API、会话、主题设置
//! - **服务** (`services`): 路由组装、设置存储
//!
//! # 模块结构
//!
//! ```text
//! admin-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # 会话令牌、Cookie、路由守卫
//! ├── catalog/       # 表格配置
//! ├── services/      # 路由组装、设置存储
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 日志
//! ```

pub mod api;
pub mod auth;
pub mod catalog;
pub mod core;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use auth::{JwtService, SessionContext};
pub use core::{Config, Server, ServerState};
pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}
