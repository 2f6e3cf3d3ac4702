use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{drawn_stock, Store, StoreResult};
use crate::database::DatabaseError;
use crate::models::{Bean, BeanInput, BrewLog, BrewLogInput, LikeStatus, Recipe, RecipeInput};

#[derive(Default)]
struct Tables {
    beans: HashMap<Uuid, Bean>,
    recipes: HashMap<Uuid, Recipe>,
    likes: HashSet<(Uuid, String)>,
    brew_logs: HashMap<Uuid, BrewLog>,
}

/// Ephemeral store for development and tests. Each instance owns its own tables.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first<T, K: Ord>(mut rows: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
    rows
}

fn like_status(tables: &Tables, id: Uuid, user: &str) -> StoreResult<LikeStatus> {
    let recipe = tables
        .recipes
        .get(&id)
        .ok_or_else(|| DatabaseError::not_found("Recipe not found"))?;
    Ok(LikeStatus {
        recipe_id: id,
        liked: tables.likes.contains(&(id, user.to_string())),
        like_count: recipe.like_count,
    })
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn list_beans(&self, owner: Option<&str>) -> StoreResult<Vec<Bean>> {
        let tables = self.tables.read().await;
        let rows = tables
            .beans
            .values()
            .filter(|b| owner.map_or(true, |o| b.user_id == o))
            .cloned()
            .collect();
        Ok(newest_first(rows, |b: &Bean| b.created_at))
    }

    async fn get_bean(&self, id: Uuid) -> StoreResult<Bean> {
        let tables = self.tables.read().await;
        tables
            .beans
            .get(&id)
            .cloned()
            .ok_or_else(|| DatabaseError::not_found("Bean not found"))
    }

    async fn create_bean(&self, owner: &str, input: &BeanInput) -> StoreResult<Bean> {
        let now = Utc::now();
        let bean = Bean {
            id: Uuid::new_v4(),
            user_id: owner.to_string(),
            name: input.name.clone(),
            roaster_name: input.roaster_name.clone(),
            origin: input.origin.clone(),
            roast_level: input.roast_level,
            process: input.process.clone(),
            roast_date: input.roast_date,
            stock_grams: input.stock_grams,
            flavor_notes: input.flavor_notes.clone(),
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.beans.insert(bean.id, bean.clone());
        Ok(bean)
    }

    async fn update_bean(&self, id: Uuid, input: &BeanInput) -> StoreResult<Bean> {
        let mut tables = self.tables.write().await;
        let bean = tables
            .beans
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::not_found("Bean not found"))?;
        bean.name = input.name.clone();
        bean.roaster_name = input.roaster_name.clone();
        bean.origin = input.origin.clone();
        bean.roast_level = input.roast_level;
        bean.process = input.process.clone();
        bean.roast_date = input.roast_date;
        bean.stock_grams = input.stock_grams;
        bean.flavor_notes = input.flavor_notes.clone();
        bean.updated_at = Utc::now();
        Ok(bean.clone())
    }

    async fn delete_bean(&self, id: Uuid) -> StoreResult<()> {
        match self.tables.write().await.beans.remove(&id) {
            Some(_) => Ok(()),
            None => Err(DatabaseError::not_found("Bean not found")),
        }
    }

    async fn list_recipes(&self, viewer: Option<&str>) -> StoreResult<Vec<Recipe>> {
        let tables = self.tables.read().await;
        let rows = tables
            .recipes
            .values()
            .filter(|r| viewer.map_or(true, |v| r.user_id == v || r.is_public))
            .cloned()
            .collect();
        Ok(newest_first(rows, |r: &Recipe| r.created_at))
    }

    async fn list_public_recipes(&self) -> StoreResult<Vec<Recipe>> {
        let tables = self.tables.read().await;
        let rows = tables.recipes.values().filter(|r| r.is_public).cloned().collect();
        Ok(newest_first(rows, |r: &Recipe| (r.like_count, r.created_at)))
    }

    async fn get_recipe(&self, id: Uuid) -> StoreResult<Recipe> {
        let tables = self.tables.read().await;
        tables
            .recipes
            .get(&id)
            .cloned()
            .ok_or_else(|| DatabaseError::not_found("Recipe not found"))
    }

    async fn create_recipe(&self, owner: &str, input: &RecipeInput) -> StoreResult<Recipe> {
        let now = Utc::now();
        let recipe = Recipe {
            id: Uuid::new_v4(),
            user_id: owner.to_string(),
            author_name: input.author_name.clone(),
            title: input.title.clone(),
            equipment: input.equipment,
            coffee_grams: input.coffee_grams,
            total_water_ml: input.total_water_ml,
            water_temperature: input.water_temperature,
            grind_size: input.grind_size,
            steps: input.steps.clone(),
            tags: input.tags.clone(),
            is_public: input.is_public,
            like_count: 0,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.recipes.insert(recipe.id, recipe.clone());
        Ok(recipe)
    }

    async fn update_recipe(&self, id: Uuid, input: &RecipeInput) -> StoreResult<Recipe> {
        let mut tables = self.tables.write().await;
        let recipe = tables
            .recipes
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::not_found("Recipe not found"))?;
        recipe.title = input.title.clone();
        recipe.author_name = input.author_name.clone();
        recipe.equipment = input.equipment;
        recipe.coffee_grams = input.coffee_grams;
        recipe.total_water_ml = input.total_water_ml;
        recipe.water_temperature = input.water_temperature;
        recipe.grind_size = input.grind_size;
        recipe.steps = input.steps.clone();
        recipe.tags = input.tags.clone();
        recipe.is_public = input.is_public;
        recipe.updated_at = Utc::now();
        Ok(recipe.clone())
    }

    async fn delete_recipe(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.recipes.remove(&id).is_none() {
            return Err(DatabaseError::not_found("Recipe not found"));
        }
        tables.likes.retain(|(recipe_id, _)| *recipe_id != id);
        Ok(())
    }

    async fn like_recipe(&self, id: Uuid, user: &str) -> StoreResult<LikeStatus> {
        let mut tables = self.tables.write().await;
        if !tables.recipes.contains_key(&id) {
            return Err(DatabaseError::not_found("Recipe not found"));
        }
        if tables.likes.insert((id, user.to_string())) {
            if let Some(recipe) = tables.recipes.get_mut(&id) {
                recipe.like_count += 1;
            }
        }
        like_status(&tables, id, user)
    }

    async fn unlike_recipe(&self, id: Uuid, user: &str) -> StoreResult<LikeStatus> {
        let mut tables = self.tables.write().await;
        if !tables.recipes.contains_key(&id) {
            return Err(DatabaseError::not_found("Recipe not found"));
        }
        if tables.likes.remove(&(id, user.to_string())) {
            if let Some(recipe) = tables.recipes.get_mut(&id) {
                recipe.like_count = (recipe.like_count - 1).max(0);
            }
        }
        like_status(&tables, id, user)
    }

    async fn like_status(&self, id: Uuid, user: &str) -> StoreResult<LikeStatus> {
        let tables = self.tables.read().await;
        like_status(&tables, id, user)
    }

    async fn list_brew_logs(&self, owner: Option<&str>) -> StoreResult<Vec<BrewLog>> {
        let tables = self.tables.read().await;
        let rows = tables
            .brew_logs
            .values()
            .filter(|l| owner.map_or(true, |o| l.user_id == o))
            .cloned()
            .collect();
        Ok(newest_first(rows, |l: &BrewLog| (l.brew_date, l.created_at)))
    }

    async fn get_brew_log(&self, id: Uuid) -> StoreResult<BrewLog> {
        let tables = self.tables.read().await;
        tables
            .brew_logs
            .get(&id)
            .cloned()
            .ok_or_else(|| DatabaseError::not_found("Brew log not found"))
    }

    async fn create_brew_log(&self, owner: &str, input: &BrewLogInput) -> StoreResult<BrewLog> {
        // One write guard for the whole operation keeps the insert and the stock draw atomic.
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let log = BrewLog {
            id: Uuid::new_v4(),
            user_id: owner.to_string(),
            recipe_id: input.recipe_id,
            bean_id: input.bean_id,
            brew_date: input.brew_date.unwrap_or(now),
            actual_duration: input.actual_duration,
            rating: input.rating,
            taste_notes: input.taste_notes.clone(),
            memo: input.memo.clone(),
            created_at: now,
        };

        if let Some((recipe_id, bean_id)) = input.stock_pairing() {
            let grams = tables.recipes.get(&recipe_id).map(|r| r.coffee_grams);
            if let (Some(grams), Some(bean)) = (grams, tables.beans.get_mut(&bean_id)) {
                bean.stock_grams = drawn_stock(bean.stock_grams, grams);
                bean.updated_at = now;
            }
        }

        tables.brew_logs.insert(log.id, log.clone());
        Ok(log)
    }

    async fn update_brew_log(&self, id: Uuid, input: &BrewLogInput) -> StoreResult<BrewLog> {
        let mut tables = self.tables.write().await;
        let log = tables
            .brew_logs
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::not_found("Brew log not found"))?;
        log.recipe_id = input.recipe_id;
        log.bean_id = input.bean_id;
        if let Some(brew_date) = input.brew_date {
            log.brew_date = brew_date;
        }
        log.actual_duration = input.actual_duration;
        log.rating = input.rating;
        log.taste_notes = input.taste_notes.clone();
        log.memo = input.memo.clone();
        Ok(log.clone())
    }

    async fn delete_brew_log(&self, id: Uuid) -> StoreResult<()> {
        match self.tables.write().await.brew_logs.remove(&id) {
            Some(_) => Ok(()),
            None => Err(DatabaseError::not_found("Brew log not found")),
        }
    }
}
