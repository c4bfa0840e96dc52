//! 服务模块
//!
//! - [`HttpService`] - 路由组装与 HTTP 服务
//! - [`SettingsStore`] - 主题设置存储

pub mod http_service;
pub mod settings;

pub use http_service::{HttpService, build_app, build_router};
pub use settings::{MemorySettingsStore, SettingsStore};
