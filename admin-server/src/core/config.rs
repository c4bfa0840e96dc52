use admin_client::ClientConfig;

use crate::auth::JwtConfig;
use crate::core::ServerError;

/// 日志配置 (需要在加载其它配置之前初始化日志)
#[derive(Debug, Clone)]
pub struct LogSettings {
    pub level: String,
    pub dir: Option<String>,
    pub json: bool,
}

impl LogSettings {
    pub fn from_env() -> Self {
        Self {
            level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            json: std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")),
        }
    }
}

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | BACKEND_API_URL | API_BASE_URL 或 http://localhost:8080 | 后端地址 |
/// | REQUEST_TIMEOUT_SECS | 30 | 后端请求超时(秒) |
/// | RBAC_CONFIG_PATH | - | 权限表 JSON，缺省使用内置表 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | - | 日志目录 (按天滚动) |
/// | LOG_FORMAT | text | `json` 输出结构化日志 |
/// | JWT_SECRET | 开发环境随机生成 | 会话令牌密钥 (≥ 32 字符) |
/// | JWT_EXPIRATION_MINUTES | 10080 | 会话有效期 |
///
/// # 示例
///
/// ```ignore
/// BACKEND_API_URL=http://backend:8080 HTTP_PORT=8000 cargo run -p admin-server
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 后端客户端配置
    pub backend: ClientConfig,
    /// 权限表配置文件
    pub rbac_config_path: Option<String>,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub log_json: bool,
    /// JWT 认证配置
    pub jwt: JwtConfig,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Result<Self, ServerError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let logging = LogSettings::from_env();
        let jwt = JwtConfig::from_env(environment == "production")?;

        Ok(Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment,
            backend: ClientConfig::from_env(),
            rbac_config_path: std::env::var("RBAC_CONFIG_PATH")
                .ok()
                .filter(|p| !p.is_empty()),
            log_level: logging.level,
            log_dir: logging.dir,
            log_json: logging.json,
            jwt,
        })
    }

    /// 显式构造 (测试用)
    pub fn new(jwt: JwtConfig, backend: ClientConfig) -> Self {
        Self {
            http_port: 3000,
            environment: "development".into(),
            backend,
            rbac_config_path: None,
            log_level: "info".into(),
            log_dir: None,
            log_json: false,
            jwt,
        }
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Cookie 是否带 `Secure`
    pub fn secure_cookies(&self) -> bool {
        self.is_production()
    }
}
