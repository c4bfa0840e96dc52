use std::net::SocketAddr;

use axum::body::Body;
use axum::response::Response;
use axum::{Router, middleware};
use tower::Service;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;

use crate::auth::route_guard;
use crate::core::{Result, ServerState};

/// HTTP 请求日志中间件
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = std::time::Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    tracing::info!(
        target: "http_access",
        "{} {} {} {}ms",
        method,
        uri,
        status,
        started.elapsed().as_millis()
    );

    response
}

/// Build the Axum router (without state)
pub fn build_app() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(crate::api::health::router())
        .merge(crate::api::auth::router())
        .merge(crate::api::settings::router())
        .merge(crate::api::tables::router())
        // 页面路由包含 `/{resource}`，放在最后
        .merge(crate::api::pages::router())
}

/// Build the full application with guard and tower layers
pub fn build_router(state: ServerState) -> Router {
    build_app()
        // 路由守卫在 Router 级别应用，内部跳过公共路由与内部资源
        .layer(middleware::from_fn_with_state(state.clone(), route_guard))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(log_request))
}

#[derive(Clone, Debug)]
pub struct HttpService {
    state: ServerState,
    router: Router,
}

impl HttpService {
    pub fn new(state: ServerState) -> Self {
        let router = build_router(state.clone());
        Self { state, router }
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// 进程内调用，不经过网络 (中间件照常执行)
    pub async fn oneshot(&self, request: http::Request<Body>) -> Response {
        let mut service = self.router.clone();
        match service.call(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        }
    }

    /// Start serving until `shutdown_signal` resolves
    pub async fn start_server<F>(&self, shutdown_signal: F) -> Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.state.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Admin server listening on {}", addr);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal)
            .await?;

        Ok(())
    }
}
