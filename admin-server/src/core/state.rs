use std::sync::Arc;

use admin_client::{HttpClient, SearchResolver, TableFetcher};
use shared::rbac::PermissionRegistry;

use crate::auth::{JwtService, SessionContext};
use crate::catalog::TableCatalog;
use crate::core::{Config, Result};
use crate::services::{MemorySettingsStore, SettingsStore};

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，所有字段在启动后只读。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 |
/// | jwt_service | Arc<JwtService> | 会话令牌服务 |
/// | registry | Arc<PermissionRegistry> | 权限表 |
/// | catalog | Arc<TableCatalog> | 表格目录 |
/// | fetcher | TableFetcher | 后端表格读取 (共享种子锁) |
/// | settings | Arc<dyn SettingsStore> | 主题设置存储 |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub jwt_service: Arc<JwtService>,
    pub registry: Arc<PermissionRegistry>,
    pub catalog: Arc<TableCatalog>,
    pub fetcher: TableFetcher,
    pub settings: Arc<dyn SettingsStore>,
}

impl ServerState {
    pub fn new(
        config: Config,
        registry: PermissionRegistry,
        catalog: TableCatalog,
        backend: HttpClient,
        settings: Arc<dyn SettingsStore>,
    ) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        Self {
            config,
            jwt_service,
            registry: Arc::new(registry),
            catalog: Arc::new(catalog),
            fetcher: TableFetcher::new(backend),
            settings,
        }
    }

    /// 按配置初始化: 加载权限表、创建后端客户端
    pub fn initialize(config: &Config) -> Result<Self> {
        let registry = match &config.rbac_config_path {
            Some(path) => {
                let registry = PermissionRegistry::from_file(path)?;
                tracing::info!(path = %path, tabs = registry.tabs().len(), "Loaded RBAC config");
                registry
            }
            None => PermissionRegistry::builtin(),
        };

        let backend = config.backend.build_http_client()?;
        tracing::info!(backend = %backend.base_url(), "Backend client ready");

        Ok(Self::new(
            config.clone(),
            registry,
            TableCatalog::builtin(),
            backend,
            Arc::new(MemorySettingsStore::new()),
        ))
    }

    pub fn get_jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    /// 带会话后端令牌的表格读取器
    pub fn fetcher_for(&self, session: &SessionContext) -> TableFetcher {
        match &session.backend_token {
            Some(token) => self.fetcher.with_token(token.as_str()),
            None => self.fetcher.clone(),
        }
    }

    pub fn search_for(&self, session: &SessionContext) -> SearchResolver {
        SearchResolver::new(self.fetcher_for(session).http().clone())
    }

    pub fn backend(&self) -> &HttpClient {
        self.fetcher.http()
    }
}
