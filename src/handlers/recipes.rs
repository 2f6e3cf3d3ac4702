// handlers/recipes.rs - /api/v1/recipes, the public ranking and likes
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
use crate::models::{CreateRecipeRequest, LikeStatus, Recipe};

const NOT_FOUND: &str = "Recipe not found";

/// GET /api/v1/recipes
///
/// An identified caller sees their own recipes plus every public one. Anonymous
/// callers see everything.
pub async fn list_recipes(State(state): State<AppState>, caller: Caller) -> ApiResult<Json<Vec<Recipe>>> {
    Ok(Json(state.store.list_recipes(caller.user_id()).await?))
}

/// GET /api/v1/recipes/public - ranked by like count, then newest
pub async fn list_public_recipes(State(state): State<AppState>) -> ApiResult<Json<Vec<Recipe>>> {
    Ok(Json(state.store.list_public_recipes().await?))
}

pub async fn get_recipe(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Recipe>> {
    let id = parse_id(&id, NOT_FOUND)?;
    Ok(Json(state.store.get_recipe(id).await?))
}

pub async fn create_recipe(
    State(state): State<AppState>,
    caller: Caller,
    ValidJson(request): ValidJson<CreateRecipeRequest>,
) -> ApiResult<(StatusCode, Json<Recipe>)> {
    let input = request.validate()?;
    let recipe = state.store.create_recipe(caller.owner_id(), &input).await?;
    tracing::info!(recipe_id = %recipe.id, public = recipe.is_public, "recipe created");
    Ok((StatusCode::CREATED, Json(recipe)))
}

pub async fn update_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(request): ValidJson<CreateRecipeRequest>,
) -> ApiResult<Json<Recipe>> {
    let id = parse_id(&id, NOT_FOUND)?;
    let input = request.validate()?;
    Ok(Json(state.store.update_recipe(id, &input).await?))
}

pub async fn delete_recipe(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    let id = parse_id(&id, NOT_FOUND)?;
    state.store.delete_recipe(id).await?;
    Ok(Json(json!({ "message": "Recipe deleted" })))
}

/// POST /api/v1/recipes/:id/like - repeat likes are no-ops
pub async fn like_recipe(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<Json<LikeStatus>> {
    let id = parse_id(&id, NOT_FOUND)?;
    Ok(Json(state.store.like_recipe(id, caller.owner_id()).await?))
}

/// DELETE /api/v1/recipes/:id/like
pub async fn unlike_recipe(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<Json<LikeStatus>> {
    let id = parse_id(&id, NOT_FOUND)?;
    Ok(Json(state.store.unlike_recipe(id, caller.owner_id()).await?))
}

pub async fn like_status(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<Json<LikeStatus>> {
    let id = parse_id(&id, NOT_FOUND)?;
    Ok(Json(state.store.like_status(id, caller.owner_id()).await?))
}
