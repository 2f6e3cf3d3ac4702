// handlers/brew_logs.rs - /api/v1/brew-logs
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
use crate::models::{BrewLog, CreateBrewLogRequest};

const NOT_FOUND: &str = "Brew log not found";

pub async fn list_brew_logs(State(state): State<AppState>, caller: Caller) -> ApiResult<Json<Vec<BrewLog>>> {
    Ok(Json(state.store.list_brew_logs(caller.user_id()).await?))
}

pub async fn get_brew_log(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<BrewLog>> {
    let id = parse_id(&id, NOT_FOUND)?;
    Ok(Json(state.store.get_brew_log(id).await?))
}

/// POST /api/v1/brew-logs
///
/// The rating is checked before anything is written. When both a recipe and a bean
/// are referenced, the store draws the recipe's dose from the bean in the same
/// transaction as the insert.
pub async fn create_brew_log(
    State(state): State<AppState>,
    caller: Caller,
    ValidJson(request): ValidJson<CreateBrewLogRequest>,
) -> ApiResult<(StatusCode, Json<BrewLog>)> {
    let input = request.validate()?;
    let log = state.store.create_brew_log(caller.owner_id(), &input).await?;
    tracing::info!(brew_log_id = %log.id, rating = log.rating, "brew log created");
    Ok((StatusCode::CREATED, Json(log)))
}

/// PUT /api/v1/brew-logs/:id - bean stock is left alone
pub async fn update_brew_log(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(request): ValidJson<CreateBrewLogRequest>,
) -> ApiResult<Json<BrewLog>> {
    let id = parse_id(&id, NOT_FOUND)?;
    let input = request.validate()?;
    Ok(Json(state.store.update_brew_log(id, &input).await?))
}

pub async fn delete_brew_log(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    let id = parse_id(&id, NOT_FOUND)?;
    state.store.delete_brew_log(id).await?;
    Ok(Json(json!({ "message": "Brew log deleted" })))
}
