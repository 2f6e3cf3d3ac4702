use std::sync::Arc;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use tower_http::trace::TraceLayer;

use crate::auth::ClaimsDecoder;
use crate::handlers;
use crate::middleware::{claims_middleware, cors_middleware};
use crate::store::{MemoryStore, Store};

/// Shared handler state: the storage backend and the token decoder
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub claims: ClaimsDecoder,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, claims: ClaimsDecoder) -> Self {
        Self { store, claims }
    }

    /// Fresh in-memory tables, for development and tests
    pub fn in_memory(jwt_secret: Option<&str>) -> Self {
        Self::new(Arc::new(MemoryStore::new()), ClaimsDecoder::new(jwt_secret))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/health", get(handlers::health))
        .nest("/api/v1", api_routes())
        // Global middleware, innermost first
        .layer(from_fn_with_state(state.clone(), claims_middleware))
        .layer(from_fn(cors_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(bean_routes())
        .merge(recipe_routes())
        .merge(brew_log_routes())
}

fn bean_routes() -> Router<AppState> {
    use handlers::beans;

    Router::new()
        .route("/beans", get(beans::list_beans).post(beans::create_bean))
        .route(
            "/beans/:id",
            get(beans::get_bean).put(beans::update_bean).delete(beans::delete_bean),
        )
}

fn recipe_routes() -> Router<AppState> {
    use handlers::recipes;

    Router::new()
        .route("/recipes", get(recipes::list_recipes).post(recipes::create_recipe))
        // Static segment wins over :id
        .route("/recipes/public", get(recipes::list_public_recipes))
        .route(
            "/recipes/:id",
            get(recipes::get_recipe)
                .put(recipes::update_recipe)
                .delete(recipes::delete_recipe),
        )
        .route(
            "/recipes/:id/like",
            get(recipes::like_status)
                .post(recipes::like_recipe)
                .delete(recipes::unlike_recipe),
        )
}

fn brew_log_routes() -> Router<AppState> {
    use handlers::brew_logs;

    Router::new()
        .route(
            "/brew-logs",
            get(brew_logs::list_brew_logs).post(brew_logs::create_brew_log),
        )
        .route(
            "/brew-logs/:id",
            get(brew_logs::get_brew_log)
                .put(brew_logs::update_brew_log)
                .delete(brew_logs::delete_brew_log),
        )
}
