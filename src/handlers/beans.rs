// handlers/beans.rs - /api/v1/beans
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use super::parse_id;
use crate::app::AppState;
use crate::error::ApiResult;
use crate::middleware::{Caller, ValidJson};
use crate::models::{Bean, CreateBeanRequest};

const NOT_FOUND: &str = "Bean not found";

/// GET /api/v1/beans - the caller's beans, or every bean when anonymous
pub async fn list_beans(State(state): State<AppState>, caller: Caller) -> ApiResult<Json<Vec<Bean>>> {
    let beans = state.store.list_beans(caller.user_id()).await?;
    Ok(Json(beans))
}

pub async fn get_bean(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Bean>> {
    let id = parse_id(&id, NOT_FOUND)?;
    Ok(Json(state.store.get_bean(id).await?))
}

/// POST /api/v1/beans
pub async fn create_bean(
    State(state): State<AppState>,
    caller: Caller,
    ValidJson(request): ValidJson<CreateBeanRequest>,
) -> ApiResult<(StatusCode, Json<Bean>)> {
    let input = request.validate()?;
    let bean = state.store.create_bean(caller.owner_id(), &input).await?;
    tracing::info!(bean_id = %bean.id, user_id = %bean.user_id, "bean created");
    Ok((StatusCode::CREATED, Json(bean)))
}

/// PUT /api/v1/beans/:id - full replace, same validation as create
pub async fn update_bean(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(request): ValidJson<CreateBeanRequest>,
) -> ApiResult<Json<Bean>> {
    let id = parse_id(&id, NOT_FOUND)?;
    let input = request.validate()?;
    Ok(Json(state.store.update_bean(id, &input).await?))
}

pub async fn delete_bean(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    let id = parse_id(&id, NOT_FOUND)?;
    state.store.delete_bean(id).await?;
    Ok(Json(json!({ "message": "Bean deleted" })))
}
