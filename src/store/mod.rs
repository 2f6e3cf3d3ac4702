//! Storage contract behind the resource handlers.
//!
//! `PgStore` is the production backend. `MemoryStore` keeps everything in an owned
//! map set and exists for local development and tests. One of the two is picked at
//! startup and handed to the router as `Arc<dyn Store>`.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::database::DatabaseError;
use crate::models::{Bean, BeanInput, BrewLog, BrewLogInput, LikeStatus, Recipe, RecipeInput};

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type StoreResult<T> = Result<T, DatabaseError>;

#[async_trait]
pub trait Store: Send + Sync {
    /// Short backend name for startup logs
    fn backend(&self) -> &'static str;

    /// Newest first. `None` owner means every user's beans.
    async fn list_beans(&self, owner: Option<&str>) -> StoreResult<Vec<Bean>>;
    async fn get_bean(&self, id: Uuid) -> StoreResult<Bean>;
    async fn create_bean(&self, owner: &str, input: &BeanInput) -> StoreResult<Bean>;
    async fn update_bean(&self, id: Uuid, input: &BeanInput) -> StoreResult<Bean>;
    async fn delete_bean(&self, id: Uuid) -> StoreResult<()>;

    /// Newest first. A viewer sees their own recipes plus public ones; `None` sees all.
    async fn list_recipes(&self, viewer: Option<&str>) -> StoreResult<Vec<Recipe>>;
    /// Public recipes ranked by like count, then creation time, both descending
    async fn list_public_recipes(&self) -> StoreResult<Vec<Recipe>>;
    async fn get_recipe(&self, id: Uuid) -> StoreResult<Recipe>;
    async fn create_recipe(&self, owner: &str, input: &RecipeInput) -> StoreResult<Recipe>;
    async fn update_recipe(&self, id: Uuid, input: &RecipeInput) -> StoreResult<Recipe>;
    async fn delete_recipe(&self, id: Uuid) -> StoreResult<()>;

    async fn like_recipe(&self, id: Uuid, user: &str) -> StoreResult<LikeStatus>;
    async fn unlike_recipe(&self, id: Uuid, user: &str) -> StoreResult<LikeStatus>;
    async fn like_status(&self, id: Uuid, user: &str) -> StoreResult<LikeStatus>;

    /// Most recent brew date first
    async fn list_brew_logs(&self, owner: Option<&str>) -> StoreResult<Vec<BrewLog>>;
    async fn get_brew_log(&self, id: Uuid) -> StoreResult<BrewLog>;
    /// Inserts the log and, when both references are set, draws the recipe's dose from
    /// the bean's stock. All of it commits together or not at all.
    async fn create_brew_log(&self, owner: &str, input: &BrewLogInput) -> StoreResult<BrewLog>;
    /// Replaces the log's fields. Never touches bean stock.
    async fn update_brew_log(&self, id: Uuid, input: &BrewLogInput) -> StoreResult<BrewLog>;
    async fn delete_brew_log(&self, id: Uuid) -> StoreResult<()>;
}

/// Stock left after drawing `grams` from `stock`, floored at zero.
/// Halves round to even, the same as Postgres casting `float8` to `integer`.
pub(crate) fn drawn_stock(stock: i32, grams: f64) -> i32 {
    (stock as f64 - grams).max(0.0).round_ties_even() as i32
}
