//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 登录、登出、当前会话
//! - [`settings`] - 主题设置
//! - [`tables`] - 表格数据接口 (分页、搜索、增删改)
//! - [`pages`] - 页面模型 (dashboard、settings、表格页)

pub mod auth;
pub mod health;
pub mod pages;
pub mod settings;
pub mod tables;
