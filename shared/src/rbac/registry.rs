//! Permission Registry
//!
//! 进程级的静态权限表，启动时构建一次，之后只读。
//!
//! ## 设计原则
//! - 路由 (tab) 与操作 (action) 两张映射表，各自映射到允许的角色集合
//! - 不提供修改 API，变更权限需重新部署配置
//! - 映射表中不存在的 tab / action 对所有角色拒绝 (fail closed)

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::role::Role;

const ALL_ROLES: &[Role] = &[Role::SuperAdmin, Role::Admin, Role::User];
const ADMIN_ROLES: &[Role] = &[Role::SuperAdmin, Role::Admin];
const SUPER_ADMIN_ONLY: &[Role] = &[Role::SuperAdmin];

/// 内置导航 tab: (id, href, label, allowed roles)
const BUILTIN_TABS: &[(&str, &str, &str, &[Role])] = &[
    ("dashboard", "/dashboard", "Dashboard", ALL_ROLES),
    ("assets", "/assets", "Assets", ALL_ROLES),
    ("brokers", "/brokers", "Brokers", ALL_ROLES),
    ("trades", "/trades", "Trades", ALL_ROLES),
    ("broker-keys", "/broker-keys", "Broker Keys", ADMIN_ROLES),
    ("option-buffers", "/option-buffers", "Option Buffers", ADMIN_ROLES),
    ("users", "/users", "Users", SUPER_ADMIN_ONLY),
    ("settings", "/settings", "Settings", ADMIN_ROLES),
];

/// 内置操作权限 ("resource.verb")
const BUILTIN_ACTIONS: &[(&str, &[Role])] = &[
    // === 交易数据 ===
    ("assets.view", ALL_ROLES),
    ("assets.create", ADMIN_ROLES),
    ("assets.update", ADMIN_ROLES),
    ("assets.delete", SUPER_ADMIN_ONLY),
    ("brokers.view", ALL_ROLES),
    ("brokers.create", ADMIN_ROLES),
    ("brokers.update", ADMIN_ROLES),
    ("brokers.delete", SUPER_ADMIN_ONLY),
    ("trades.view", ALL_ROLES),
    ("trades.create", ADMIN_ROLES),
    ("trades.update", ADMIN_ROLES),
    ("trades.delete", SUPER_ADMIN_ONLY),
    // === 敏感数据 ===
    ("broker-keys.view", ADMIN_ROLES),
    ("broker-keys.create", ADMIN_ROLES),
    ("broker-keys.update", ADMIN_ROLES),
    ("broker-keys.delete", SUPER_ADMIN_ONLY),
    ("option-buffers.view", ADMIN_ROLES),
    ("option-buffers.create", ADMIN_ROLES),
    ("option-buffers.update", ADMIN_ROLES),
    ("option-buffers.delete", SUPER_ADMIN_ONLY),
    // === 用户管理 ===
    ("users.view", SUPER_ADMIN_ONLY),
    ("users.create", SUPER_ADMIN_ONLY),
    ("users.update", SUPER_ADMIN_ONLY),
    ("users.delete", SUPER_ADMIN_ONLY),
    // === 设置 ===
    ("settings.update", ADMIN_ROLES),
    ("theme.update", ALL_ROLES),
];

/// Tab / 路由描述
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabDescriptor {
    pub id: String,
    pub href: String,
    #[serde(default)]
    pub label: String,
    pub allowed_roles: Vec<Role>,
}

impl TabDescriptor {
    /// href 的第一段路径，路由守卫按它查表
    pub fn route_key(&self) -> &str {
        route_key(&self.href)
    }
}

/// 操作权限描述
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionPermission {
    pub action_id: String,
    pub allowed_roles: Vec<Role>,
}

/// 权限配置文件格式
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryConfig {
    #[serde(default)]
    pub tabs: Vec<TabDescriptor>,
    #[serde(default)]
    pub actions: Vec<ActionPermission>,
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("duplicate tab id: {0}")]
    DuplicateTab(String),

    #[error("duplicate route key '{key}' (tab {tab})")]
    DuplicateRoute { key: String, tab: String },

    #[error("duplicate action id: {0}")]
    DuplicateAction(String),

    #[error("empty identifier in {0}")]
    EmptyId(&'static str),

    #[error("tab {tab} has invalid href: {href}")]
    InvalidHref { tab: String, href: String },

    #[error("failed to read registry config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse registry config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// 路由 → 角色、操作 → 角色 的不可变映射
#[derive(Debug, Clone)]
pub struct PermissionRegistry {
    tabs: Vec<TabDescriptor>,
    tab_roles: HashMap<String, HashSet<Role>>,
    route_roles: HashMap<String, HashSet<Role>>,
    action_roles: HashMap<String, HashSet<Role>>,
}

impl PermissionRegistry {
    /// 内置权限表
    pub fn builtin() -> Self {
        let tabs = BUILTIN_TABS
            .iter()
            .map(|(id, href, label, roles)| TabDescriptor {
                id: id.to_string(),
                href: href.to_string(),
                label: label.to_string(),
                allowed_roles: roles.to_vec(),
            })
            .collect();
        let actions = BUILTIN_ACTIONS
            .iter()
            .map(|(id, roles)| ActionPermission {
                action_id: id.to_string(),
                allowed_roles: roles.to_vec(),
            })
            .collect();

        // 内置表在测试中校验过，这里不会失败
        match Self::from_config(RegistryConfig { tabs, actions }) {
            Ok(registry) => registry,
            Err(e) => unreachable!("builtin permission table is invalid: {e}"),
        }
    }

    /// 从配置构建并校验
    pub fn from_config(config: RegistryConfig) -> Result<Self, RegistryError> {
        let mut tab_roles = HashMap::new();
        let mut route_roles = HashMap::new();

        for tab in &config.tabs {
            if tab.id.trim().is_empty() {
                return Err(RegistryError::EmptyId("tabs"));
            }
            if !tab.href.starts_with('/') || tab.route_key().is_empty() {
                return Err(RegistryError::InvalidHref {
                    tab: tab.id.clone(),
                    href: tab.href.clone(),
                });
            }
            let roles: HashSet<Role> = tab.allowed_roles.iter().copied().collect();
            if tab_roles.insert(tab.id.clone(), roles.clone()).is_some() {
                return Err(RegistryError::DuplicateTab(tab.id.clone()));
            }
            if route_roles
                .insert(tab.route_key().to_string(), roles)
                .is_some()
            {
                return Err(RegistryError::DuplicateRoute {
                    key: tab.route_key().to_string(),
                    tab: tab.id.clone(),
                });
            }
        }

        let mut action_roles = HashMap::new();
        for action in &config.actions {
            if action.action_id.trim().is_empty() {
                return Err(RegistryError::EmptyId("actions"));
            }
            let roles: HashSet<Role> = action.allowed_roles.iter().copied().collect();
            if action_roles
                .insert(action.action_id.clone(), roles)
                .is_some()
            {
                return Err(RegistryError::DuplicateAction(action.action_id.clone()));
            }
        }

        Ok(Self {
            tabs: config.tabs,
            tab_roles,
            route_roles,
            action_roles,
        })
    }

    /// 从 JSON 字符串加载
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let config: RegistryConfig = serde_json::from_str(json)?;
        Self::from_config(config)
    }

    /// 从 JSON 文件加载
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// 全部 tab，保持配置顺序
    pub fn tabs(&self) -> &[TabDescriptor] {
        &self.tabs
    }

    pub fn tab(&self, tab_id: &str) -> Option<&TabDescriptor> {
        self.tabs.iter().find(|t| t.id == tab_id)
    }

    pub fn tab_roles(&self, tab_id: &str) -> Option<&HashSet<Role>> {
        self.tab_roles.get(tab_id)
    }

    /// 按路由第一段查找允许的角色
    pub fn route_roles(&self, key: &str) -> Option<&HashSet<Role>> {
        self.route_roles.get(key)
    }

    pub fn action_roles(&self, action_id: &str) -> Option<&HashSet<Role>> {
        self.action_roles.get(action_id)
    }

    pub fn action_ids(&self) -> impl Iterator<Item = &str> {
        self.action_roles.keys().map(String::as_str)
    }
}

impl Default for PermissionRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// 请求路径的第一段 (`/settings/theme` → `settings`, `/` → ``)
pub fn route_key(path: &str) -> &str {
    let trimmed = path.trim_start_matches('/');
    let end = trimmed.find(['/', '?', '#']).unwrap_or(trimmed.len());
    &trimmed[..end]
}
