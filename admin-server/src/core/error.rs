use admin_client::ClientError;
use shared::rbac::RegistryError;
use thiserror::Error;

use crate::auth::JwtError;

/// 启动与运行期错误 (请求级错误使用 `AppError`)
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("配置错误: {0}")]
    Config(#[from] JwtError),

    #[error("权限表加载失败: {0}")]
    Registry(#[from] RegistryError),

    #[error("后端客户端初始化失败: {0}")]
    Client(#[from] ClientError),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
