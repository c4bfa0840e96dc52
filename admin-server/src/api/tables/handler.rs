//! Table API Handlers

use admin_client::SearchParams;
use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::Value;
use shared::error::{ApiResponse, AppError, AppResult};
use shared::query::{QueryResponse, SearchOption};

use crate::auth::SessionContext;
use crate::core::ServerState;

/// One page of records
pub async fn list(
    State(state): State<ServerState>,
    session: SessionContext,
    Path(resource): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> AppResult<Json<ApiResponse<QueryResponse>>> {
    let table = state.catalog.require(&resource)?;
    state.registry.verify_action(session.role, &table.action("view"))?;

    let request = table.parse_query(pairs)?;
    let page = state
        .fetcher_for(&session)
        .fetch_page(&table.endpoint, &request, table.sample_record.as_ref())
        .await?;

    Ok(Json(ApiResponse::success(page)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub label_key: Option<String>,
    pub value_key: Option<String>,
    pub limit: Option<u32>,
}

/// Typeahead options; backend failures yield an empty list
pub async fn search(
    State(state): State<ServerState>,
    session: SessionContext,
    Path(resource): Path<String>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<ApiResponse<Vec<SearchOption>>>> {
    let table = state.catalog.require(&resource)?;
    state.registry.verify_action(session.role, &table.action("view"))?;

    let defaults = SearchParams::default();
    let params = SearchParams {
        label_key: query.label_key.unwrap_or(defaults.label_key),
        value_key: query.value_key.unwrap_or(defaults.value_key),
        limit: query.limit.unwrap_or(defaults.limit),
    };

    let options = state
        .search_for(&session)
        .search(&table.endpoint, query.q.trim(), &table.search_fields, &params)
        .await;

    Ok(Json(ApiResponse::success(options)))
}

fn require_object(record: &Value) -> AppResult<()> {
    if record.is_object() {
        Ok(())
    } else {
        Err(AppError::validation("Record must be a JSON object"))
    }
}

pub async fn create(
    State(state): State<ServerState>,
    session: SessionContext,
    Path(resource): Path<String>,
    Json(record): Json<Value>,
) -> AppResult<Json<ApiResponse<Value>>> {
    let table = state.catalog.require(&resource)?;
    state.registry.verify_action(session.role, &table.action("create"))?;
    require_object(&record)?;

    let created = state
        .fetcher_for(&session)
        .http()
        .create_record(&table.endpoint, &record)
        .await?;

    tracing::info!(user_id = %session.user_id, resource = %resource, "Record created");
    Ok(Json(ApiResponse::success(created)))
}

pub async fn update(
    State(state): State<ServerState>,
    session: SessionContext,
    Path((resource, id)): Path<(String, String)>,
    Json(record): Json<Value>,
) -> AppResult<Json<ApiResponse<Value>>> {
    let table = state.catalog.require(&resource)?;
    state.registry.verify_action(session.role, &table.action("update"))?;
    require_object(&record)?;

    let updated = state
        .fetcher_for(&session)
        .http()
        .update_record(&table.endpoint, &id, &record)
        .await?;

    tracing::info!(user_id = %session.user_id, resource = %resource, id = %id, "Record updated");
    Ok(Json(ApiResponse::success(updated)))
}

pub async fn delete(
    State(state): State<ServerState>,
    session: SessionContext,
    Path((resource, id)): Path<(String, String)>,
) -> AppResult<ApiResponse<()>> {
    let table = state.catalog.require(&resource)?;
    state.registry.verify_action(session.role, &table.action("delete"))?;

    state
        .fetcher_for(&session)
        .http()
        .delete_record(&table.endpoint, &id)
        .await?;

    tracing::info!(user_id = %session.user_id, resource = %resource, id = %id, "Record deleted");
    Ok(ApiResponse::ok())
}
