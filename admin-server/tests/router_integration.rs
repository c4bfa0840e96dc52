// admin-server/tests/router_integration.rs
// 路由级集成测试: 完整中间件栈 + 进程内模拟后端

use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex};

use admin_client::ClientConfig;
use admin_server::auth::JwtConfig;
use admin_server::catalog::TableCatalog;
use admin_server::services::{HttpService, MemorySettingsStore, build_router};
use admin_server::{Config, ServerState};
use axum::Router;
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, Request, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Json;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use shared::rbac::PermissionRegistry;
use shared::session::UserProfile;
use tower::ServiceExt;

const SECRET: &str = "router-test-secret-that-is-long-enough-0123456789";
const OFFLINE: &str = "http://127.0.0.1:9";

// ========== 模拟后端 ==========

#[derive(Default)]
struct MockBackend {
    collections: Mutex<HashMap<String, Vec<Value>>>,
    last_authorization: Mutex<Option<String>>,
}

fn failure(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(json!({"success": false, "error": {"code": code, "message": message}})),
    )
        .into_response()
}

async fn backend_login(Json(body): Json<Value>) -> Response {
    if body["password"] != "secret" {
        return failure(StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS", "bad password");
    }
    Json(json!({
        "success": true,
        "data": {
            "token": "backend-abc",
            "user": {"id": "u1", "email": body["email"], "name": "Ada", "role": "admin"}
        }
    }))
    .into_response()
}

async fn backend_list(
    State(state): State<Arc<MockBackend>>,
    Path(collection): Path<String>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    *state.last_authorization.lock().unwrap() = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let collections = state.collections.lock().unwrap();
    let Some(records) = collections.get(&collection).filter(|r| !r.is_empty()) else {
        return failure(StatusCode::NOT_FOUND, "NOT_FOUND", "collection is empty");
    };

    let limit: usize = params
        .get("limit")
        .and_then(|l| l.parse().ok())
        .unwrap_or(20);
    let page: Vec<Value> = records.iter().take(limit).cloned().collect();

    Json(json!({
        "success": true,
        "data": page,
        "pagination": {"hasMore": records.len() > limit, "nextCursor": null}
    }))
    .into_response()
}

async fn backend_create(
    State(state): State<Arc<MockBackend>>,
    Path(collection): Path<String>,
    Json(mut record): Json<Value>,
) -> Response {
    let mut collections = state.collections.lock().unwrap();
    let records = collections.entry(collection).or_default();
    record["id"] = json!(records.len() + 1);
    records.push(record.clone());
    (StatusCode::CREATED, Json(json!({"success": true, "data": record}))).into_response()
}

async fn spawn_backend(backend: Arc<MockBackend>) -> String {
    let app = Router::new()
        .route("/auth/login", post(backend_login))
        .route("/{collection}", get(backend_list).post(backend_create))
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn seeded_backend() -> Arc<MockBackend> {
    let backend = MockBackend::default();
    {
        let mut collections = backend.collections.lock().unwrap();
        collections.insert(
            "assets".to_string(),
            vec![
                json!({"id": 1, "symbol": "AAPL", "name": "Apple Inc.", "assetClass": "equity", "active": true}),
                json!({"id": 2, "symbol": "MSFT", "name": "Microsoft", "assetClass": "equity", "active": true}),
            ],
        );
        collections.insert(
            "brokers".to_string(),
            vec![json!({"id": 1, "name": "Interactive Brokers", "code": "IBKR", "region": "us"})],
        );
        collections.insert(
            "trades".to_string(),
            vec![json!({
                "id": 10, "assetId": 1, "brokerId": 1, "side": "buy",
                "quantity": 5, "price": 187.456, "status": "filled", "reference": "T-10"
            })],
        );
    }
    Arc::new(backend)
}

// ========== 控制台 ==========

fn config(backend_url: &str) -> Config {
    Config::new(JwtConfig::with_secret(SECRET), ClientConfig::new(backend_url))
}

fn state_with(config: Config, registry: PermissionRegistry) -> ServerState {
    let backend = config.backend.build_http_client().unwrap();
    ServerState::new(
        config,
        registry,
        TableCatalog::builtin(),
        backend,
        Arc::new(MemorySettingsStore::new()),
    )
}

fn app(backend_url: &str) -> (Router, ServerState) {
    let state = state_with(config(backend_url), PermissionRegistry::builtin());
    (build_router(state.clone()), state)
}

fn token_for(state: &ServerState, role: &str) -> String {
    let user = UserProfile {
        id: format!("{}-1", role),
        email: format!("{}@example.com", role),
        name: role.to_string(),
        role: role.to_string(),
    };
    state
        .get_jwt_service()
        .generate_token(&user, Some("backend-abc"))
        .unwrap()
}

fn get_request(path: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(path);
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, format!("token={}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn json_request(method: &str, path: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, format!("token={}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ========== 路由守卫 ==========

#[tokio::test]
async fn test_protected_page_without_session_redirects_to_login() {
    let (router, _) = app(OFFLINE);

    let response = router.oneshot(get_request("/dashboard", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_malformed_token_is_treated_as_anonymous() {
    let (router, _) = app(OFFLINE);

    let response = router
        .oneshot(get_request("/dashboard", Some("not.a.jwt")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_public_page_with_session_redirects_to_dashboard() {
    let (router, state) = app(OFFLINE);
    let token = token_for(&state, "user");

    let response = router
        .clone()
        .oneshot(get_request("/login", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard");

    // 未登录时登录页正常返回
    let response = router.oneshot(get_request("/login", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["submitTo"], "/api/auth/login");
}

#[tokio::test]
async fn test_route_not_allowed_for_role_redirects_to_unauthorized() {
    let (router, state) = app(OFFLINE);
    let user = token_for(&state, "user");
    let admin = token_for(&state, "admin");

    let response = router
        .clone()
        .oneshot(get_request("/settings", Some(&user)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/unauthorized");

    let response = router
        .clone()
        .oneshot(get_request("/users", Some(&admin)))
        .await
        .unwrap();
    assert_eq!(location(&response), "/unauthorized");

    let response = router
        .oneshot(get_request("/settings", Some(&admin)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["canUpdateSettings"], true);
    assert_eq!(body["canUpdateTheme"], true);
}

#[tokio::test]
async fn test_unrecognized_role_is_denied_everywhere() {
    let (router, state) = app(OFFLINE);
    let token = token_for(&state, "auditor");

    let response = router
        .clone()
        .oneshot(get_request("/assets", Some(&token)))
        .await
        .unwrap();
    assert_eq!(location(&response), "/unauthorized");

    let response = router
        .oneshot(get_request("/api/tables/assets", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_internal_and_api_routes() {
    let (router, state) = app(OFFLINE);

    let response = router.clone().oneshot(get_request("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["backend"], OFFLINE);

    // API 未登录返回 401 而不是重定向
    let response = router
        .clone()
        .oneshot(get_request("/api/auth/me", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let token = token_for(&state, "admin");
    let response = router
        .oneshot(get_request("/api/auth/me", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["role"], "admin");
    assert_eq!(body["data"]["userId"], "admin-1");
}

#[tokio::test]
async fn test_service_oneshot_runs_guard() {
    let (_, state) = app(OFFLINE);
    let service = HttpService::new(state);

    let response = service.oneshot(get_request("/health", None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = service.oneshot(get_request("/trades", None)).await;
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_index_redirects_to_dashboard() {
    let (router, state) = app(OFFLINE);
    let token = token_for(&state, "user");

    let response = router.oneshot(get_request("/", Some(&token))).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard");
}

// ========== 页面 ==========

#[tokio::test]
async fn test_dashboard_navigation_follows_role() {
    let (router, state) = app(OFFLINE);

    let user = token_for(&state, "user");
    let body = body_json(
        router
            .clone()
            .oneshot(get_request("/dashboard", Some(&user)))
            .await
            .unwrap(),
    )
    .await;
    let tabs: Vec<&str> = body["navigation"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap())
        .collect();
    assert_eq!(tabs, vec!["dashboard", "assets", "brokers", "trades"]);
    assert_eq!(body["user"]["role"], "user");
    assert_eq!(body["theme"]["mode"], "system");

    let super_admin = token_for(&state, "super_admin");
    let body = body_json(
        router
            .oneshot(get_request("/dashboard", Some(&super_admin)))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["navigation"].as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn test_table_page_renders_rows_and_filter_options() {
    let backend = seeded_backend();
    let url = spawn_backend(backend.clone()).await;
    let (router, state) = app(&url);
    let token = token_for(&state, "user");

    let response = router
        .oneshot(get_request("/trades?limit=10", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    assert_eq!(body["resource"], "trades");
    assert_eq!(body["query"]["sortBy"], "tradedAt");
    assert_eq!(body["rows"][0]["id"], "10");
    assert!(
        body["rows"][0]["cells"]
            .as_array()
            .unwrap()
            .contains(&json!("187.46"))
    );

    let assets = body["filterOptions"]["assetId"].as_array().unwrap();
    assert_eq!(assets.len(), 2);
    assert_eq!(assets[0]["label"], "AAPL");
    assert_eq!(assets[0]["value"], 1);
    assert_eq!(body["filterOptions"]["brokerId"][0]["label"], "Interactive Brokers");

    assert_eq!(body["actions"]["create"], false);
    assert_eq!(body["actions"]["delete"], false);

    // 后端收到的是会话里的后端令牌
    assert_eq!(
        backend.last_authorization.lock().unwrap().as_deref(),
        Some("Bearer backend-abc")
    );
}

#[tokio::test]
async fn test_table_page_rejects_unknown_columns() {
    let backend = seeded_backend();
    let url = spawn_backend(backend).await;
    let (router, state) = app(&url);
    let token = token_for(&state, "user");

    let response = router
        .oneshot(get_request("/assets?sortBy=password", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ========== 登录 / 登出 ==========

#[tokio::test]
async fn test_login_sets_session_cookies() {
    let url = spawn_backend(seeded_backend()).await;
    let (router, state) = app(&url);

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({"email": "ada@example.com", "password": "secret"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookies: Vec<String> = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    assert_eq!(cookies.len(), 3);
    let token_cookie = cookies.iter().find(|c| c.starts_with("token=")).unwrap();
    assert!(token_cookie.contains("HttpOnly"));
    assert!(token_cookie.contains("SameSite=Strict"));
    assert!(cookies.iter().any(|c| c.starts_with("userRole=admin;")));

    let body = body_json(response).await;
    assert_eq!(body["data"]["redirectTo"], "/dashboard");
    assert_eq!(body["data"]["user"]["role"], "admin");

    // 签发的令牌可以通过守卫
    let token = token_cookie
        .trim_start_matches("token=")
        .split(';')
        .next()
        .unwrap();
    let claims = state.get_jwt_service().validate_token(token).unwrap();
    assert_eq!(claims.backend_token.as_deref(), Some("backend-abc"));

    let response = router
        .oneshot(get_request("/api/auth/me", Some(token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_with_bad_credentials() {
    let url = spawn_backend(seeded_backend()).await;
    let (router, _) = app(&url);

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({"email": "ada@example.com", "password": "wrong"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({"email": "  ", "password": "secret"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_logout_clears_cookies() {
    let (router, state) = app(OFFLINE);
    let token = token_for(&state, "user");

    let response = router
        .oneshot(json_request("POST", "/api/auth/logout", Some(&token), json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookies: Vec<&str> = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap())
        .collect();
    assert_eq!(cookies.len(), 3);
    assert!(cookies.iter().all(|c| c.contains("Max-Age=0")));
}

// ========== 表格 API ==========

#[tokio::test]
async fn test_table_api_enforces_actions() {
    let backend = seeded_backend();
    let url = spawn_backend(backend.clone()).await;
    let (router, state) = app(&url);
    let user = token_for(&state, "user");
    let admin = token_for(&state, "admin");

    let response = router
        .clone()
        .oneshot(get_request("/api/tables/assets?limit=1", Some(&user)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["pagination"]["hasMore"], true);

    let response = router
        .clone()
        .oneshot(json_request("DELETE", "/api/tables/assets/1", Some(&user), json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/tables/assets",
            Some(&admin),
            json!({"symbol": "NVDA", "name": "Nvidia"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["id"], 3);
    assert_eq!(backend.collections.lock().unwrap()["assets"].len(), 3);

    let response = router
        .clone()
        .oneshot(json_request("POST", "/api/tables/assets", Some(&admin), json!([1, 2])))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = router
        .oneshot(get_request("/api/tables/positions", Some(&admin)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_empty_collection_is_seeded_on_first_view() {
    let backend = Arc::new(MockBackend::default());
    let url = spawn_backend(backend.clone()).await;
    let (router, state) = app(&url);
    let token = token_for(&state, "admin");

    let response = router
        .oneshot(get_request("/api/tables/brokers", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["data"][0]["code"], "IBKR");
    assert_eq!(backend.collections.lock().unwrap()["brokers"].len(), 1);
}

#[tokio::test]
async fn test_search_degrades_to_empty_when_backend_is_down() {
    let (router, state) = app(OFFLINE);
    let token = token_for(&state, "user");

    let response = router
        .oneshot(get_request("/api/tables/assets/search?q=app", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"], json!([]));
}

// ========== 主题设置 ==========

#[tokio::test]
async fn test_theme_round_trip_per_user() {
    let (router, state) = app(OFFLINE);
    let user = token_for(&state, "user");
    let admin = token_for(&state, "admin");

    let response = router
        .clone()
        .oneshot(get_request("/api/settings/theme", Some(&user)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["primaryColor"], "#2563EB");

    let theme = json!({"mode": "dark", "primaryColor": "#10B981", "fontFamily": "Inter", "radius": 1.0});
    let response = router
        .clone()
        .oneshot(json_request("PUT", "/api/settings/theme", Some(&user), theme))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(
        router
            .clone()
            .oneshot(get_request("/api/settings/theme", Some(&user)))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["data"]["mode"], "dark");

    // 其他用户不受影响
    let body = body_json(
        router
            .clone()
            .oneshot(get_request("/api/settings/theme", Some(&admin)))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["data"]["mode"], "system");

    let invalid = json!({"mode": "dark", "primaryColor": "teal"});
    let response = router
        .oneshot(json_request("PUT", "/api/settings/theme", Some(&user), invalid))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ========== 权限表配置文件 ==========

#[tokio::test]
async fn test_registry_loaded_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let registry = json!({
        "tabs": [
            {"id": "dashboard", "href": "/dashboard", "label": "Home", "allowedRoles": ["user"]},
            {"id": "settings", "href": "/settings", "label": "Settings", "allowedRoles": ["user"]}
        ],
        "actions": [
            {"actionId": "theme.update", "allowedRoles": ["user"]}
        ]
    });
    file.write_all(registry.to_string().as_bytes()).unwrap();

    let mut server_config = config(OFFLINE);
    server_config.rbac_config_path = Some(file.path().to_string_lossy().to_string());
    let state = ServerState::initialize(&server_config).unwrap();
    let router = build_router(state.clone());

    let user = token_for(&state, "user");
    let response = router
        .clone()
        .oneshot(get_request("/settings", Some(&user)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["canUpdateSettings"], false);
    assert_eq!(body["navigation"].as_array().unwrap().len(), 2);

    // 文件中没有 assets.view，表格 API 对所有角色关闭
    let response = router
        .oneshot(get_request("/api/tables/assets", Some(&user)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
