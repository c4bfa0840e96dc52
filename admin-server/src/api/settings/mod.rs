//! Theme Settings Routes
//!
//! - GET /api/settings/theme: 当前用户的主题 (未保存过时返回默认值)
//! - PUT /api/settings/theme: 保存主题 (`theme.update`)

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use shared::error::{ApiResponse, AppResult};
use shared::settings::ThemeSettings;

use crate::auth::SessionContext;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/settings/theme", get(get_theme).put(update_theme))
}

async fn get_theme(
    State(state): State<ServerState>,
    session: SessionContext,
) -> AppResult<Json<ApiResponse<ThemeSettings>>> {
    let theme = state
        .settings
        .load(&session.user_id)
        .await?
        .unwrap_or_default();
    Ok(Json(ApiResponse::success(theme)))
}

async fn update_theme(
    State(state): State<ServerState>,
    session: SessionContext,
    Json(theme): Json<ThemeSettings>,
) -> AppResult<Json<ApiResponse<ThemeSettings>>> {
    state.registry.verify_action(session.role, "theme.update")?;
    theme.validate()?;

    state.settings.save(&session.user_id, theme.clone()).await?;
    tracing::info!(user_id = %session.user_id, mode = ?theme.mode, "Theme updated");

    Ok(Json(ApiResponse::success(theme)))
}
