//! Access Evaluator
//!
//! 纯函数: 输入 (角色, 权限表)，输出是否允许。没有副作用。
//! 角色为 `None` (未登录或 claim 非法) 时一律拒绝。

use crate::error::{AppError, AppResult, ErrorCode};

use super::registry::{PermissionRegistry, TabDescriptor};
use super::role::Role;

impl PermissionRegistry {
    /// 角色能否访问 tab: 当且仅当 tab 已登记且角色在允许集合中
    pub fn can_access_tab(&self, role: Option<Role>, tab_id: &str) -> bool {
        match (role, self.tab_roles(tab_id)) {
            (Some(role), Some(roles)) => roles.contains(&role),
            _ => false,
        }
    }

    /// 角色能否执行操作 (`"resource.verb"`)
    pub fn can_perform_action(&self, role: Option<Role>, action_id: &str) -> bool {
        match (role, self.action_roles(action_id)) {
            (Some(role), Some(roles)) => roles.contains(&role),
            _ => false,
        }
    }

    /// 过滤出角色可访问的 tab，保持输入顺序
    pub fn accessible_tabs<'a>(
        &self,
        role: Option<Role>,
        all_tabs: &'a [TabDescriptor],
    ) -> Vec<&'a TabDescriptor> {
        all_tabs
            .iter()
            .filter(|tab| self.can_access_tab(role, &tab.id))
            .collect()
    }

    /// 操作级校验，拒绝时返回带可读信息的错误
    pub fn verify_action(&self, role: Option<Role>, action_id: &str) -> AppResult<()> {
        let Some(role) = role else {
            return Err(AppError::with_message(
                ErrorCode::RoleRequired,
                format!("A valid role is required to perform '{}'", action_id),
            ));
        };

        match self.action_roles(action_id) {
            None => Err(AppError::with_message(
                ErrorCode::UnknownAction,
                format!("Action '{}' is not available", action_id),
            )
            .with_detail("action", action_id)),
            Some(roles) if roles.contains(&role) => Ok(()),
            Some(_) => Err(AppError::permission_denied(format!(
                "Role '{}' is not allowed to perform '{}'",
                role, action_id
            ))
            .with_detail("action", action_id)
            .with_detail("role", role.as_str())),
        }
    }
}
