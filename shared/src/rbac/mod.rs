//! 基于角色的访问控制 (RBAC)
//!
//! - [`Role`] - 会话角色
//! - [`PermissionRegistry`] - 路由 / 操作 → 角色 的静态映射
//! - 访问判定见 [`PermissionRegistry::can_access_tab`] 等方法

mod access;
pub mod registry;
pub mod role;

pub use registry::{
    ActionPermission, PermissionRegistry, RegistryConfig, RegistryError, TabDescriptor, route_key,
};
pub use role::{Role, UnknownRole};
