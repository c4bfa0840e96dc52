use admin_server::core::LogSettings;
use admin_server::{Config, Server, init_logger_with_file};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 加载 .env
    dotenv::dotenv().ok();

    // 2. 初始化日志 (配置加载过程中的告警也要能输出)
    let logging = LogSettings::from_env();
    init_logger_with_file(Some(&logging.level), logging.json, logging.dir.as_deref());

    // 3. 加载配置
    let config = Config::from_env()?;
    tracing::info!(
        environment = %config.environment,
        backend = %config.backend.base_url,
        port = config.http_port,
        "Admin server starting..."
    );

    // 4. 启动 HTTP 服务器
    let server = Server::new(config);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
