//! Page Handlers

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use serde::Serialize;
use shared::error::AppResult;
use shared::query::{Pagination, QueryRequest, SearchOption};
use shared::rbac::{Role, TabDescriptor};
use shared::settings::ThemeSettings;
use shared::table::{ColumnDescriptor, ColumnKind};

use crate::auth::{DASHBOARD_PATH, SessionContext};
use crate::catalog::TableRow;
use crate::core::ServerState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Option<Role>,
}

/// 所有登录后页面共用的外壳
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub user: PageUser,
    pub navigation: Vec<TabDescriptor>,
    pub theme: ThemeSettings,
}

async fn layout(state: &ServerState, session: &SessionContext) -> AppResult<Layout> {
    let navigation = state
        .registry
        .accessible_tabs(session.role, state.registry.tabs())
        .into_iter()
        .cloned()
        .collect();
    let theme = state
        .settings
        .load(&session.user_id)
        .await?
        .unwrap_or_default();

    Ok(Layout {
        user: PageUser {
            id: session.user_id.clone(),
            email: session.email.clone(),
            name: session.name.clone(),
            role: session.role,
        },
        navigation,
        theme,
    })
}

pub async fn index() -> Redirect {
    Redirect::to(DASHBOARD_PATH)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginPage {
    pub title: &'static str,
    pub submit_to: &'static str,
    pub signup_href: &'static str,
    pub forgot_password_href: &'static str,
}

pub async fn login() -> Json<LoginPage> {
    Json(LoginPage {
        title: "Sign in",
        submit_to: "/api/auth/login",
        signup_href: "/signup",
        forgot_password_href: "/forgot-password",
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnauthorizedPage {
    pub title: &'static str,
    pub message: String,
    pub role: Option<Role>,
    pub back_href: &'static str,
}

pub async fn unauthorized(session: SessionContext) -> Json<UnauthorizedPage> {
    let message = match session.role {
        Some(role) => format!("Your role ({}) does not have access to this page.", role),
        None => "Your account has no recognized role.".to_string(),
    };
    Json(UnauthorizedPage {
        title: "Access denied",
        message,
        role: session.role,
        back_href: DASHBOARD_PATH,
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardPage {
    pub title: &'static str,
    #[serde(flatten)]
    pub layout: Layout,
}

pub async fn dashboard(
    State(state): State<ServerState>,
    session: SessionContext,
) -> AppResult<Json<DashboardPage>> {
    Ok(Json(DashboardPage {
        title: "Dashboard",
        layout: layout(&state, &session).await?,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPage {
    pub title: &'static str,
    #[serde(flatten)]
    pub layout: Layout,
    pub can_update_theme: bool,
    pub can_update_settings: bool,
}

pub async fn settings(
    State(state): State<ServerState>,
    session: SessionContext,
) -> AppResult<Json<SettingsPage>> {
    Ok(Json(SettingsPage {
        title: "Settings",
        can_update_theme: state.registry.can_perform_action(session.role, "theme.update"),
        can_update_settings: state
            .registry
            .can_perform_action(session.role, "settings.update"),
        layout: layout(&state, &session).await?,
    }))
}

#[derive(Debug, Serialize)]
pub struct TableActions {
    pub create: bool,
    pub update: bool,
    pub delete: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TablePage {
    pub resource: String,
    pub title: String,
    #[serde(flatten)]
    pub layout: Layout,
    pub columns: Vec<ColumnDescriptor>,
    pub search_fields: Vec<String>,
    /// select 列的候选项 (列 key → 选项)
    pub filter_options: BTreeMap<String, Vec<SearchOption>>,
    pub query: QueryRequest,
    pub rows: Vec<TableRow>,
    pub pagination: Pagination,
    pub actions: TableActions,
}

pub async fn table(
    State(state): State<ServerState>,
    session: SessionContext,
    Path(resource): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> AppResult<Json<TablePage>> {
    let table = state.catalog.require(&resource)?;
    state.registry.verify_action(session.role, &table.action("view"))?;
    let request = table.parse_query(pairs)?;

    let page = state
        .fetcher_for(&session)
        .fetch_page(&table.endpoint, &request, table.sample_record.as_ref())
        .await?;

    // 过滤选项失败时为空列表，不影响页面
    let search = state.search_for(&session);
    let mut filter_options = BTreeMap::new();
    for column in table.columns.iter().filter(|c| c.filterable) {
        if let ColumnKind::Select {
            endpoint,
            label_key,
            value_key,
        } = &column.kind
        {
            let options = search.load_options(endpoint, label_key, value_key).await;
            filter_options.insert(column.key.clone(), options);
        }
    }

    let role = session.role;
    let actions = TableActions {
        create: state.registry.can_perform_action(role, &table.action("create")),
        update: state.registry.can_perform_action(role, &table.action("update")),
        delete: state.registry.can_perform_action(role, &table.action("delete")),
    };

    Ok(Json(TablePage {
        resource: table.resource.clone(),
        title: table.title.clone(),
        layout: layout(&state, &session).await?,
        columns: table.columns.clone(),
        search_fields: table.search_fields.clone(),
        filter_options,
        query: request,
        rows: page.data.iter().map(|r| table.render_row(r)).collect(),
        pagination: page.pagination,
        actions,
    }))
}
