use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::Row;
use uuid::Uuid;

use super::{Store, StoreResult};
use crate::database::{Database, DatabaseError};
use crate::models::{
    Bean, BeanInput, BrewLog, BrewLogInput, Equipment, GrindSize, LikeStatus, Recipe, RecipeInput,
    RecipeStep, RoastLevel, TasteNote,
};

const BEAN_COLUMNS: &str = "id, user_id, name, roaster_name, origin, roast_level, process, \
     roast_date, stock_grams, flavor_notes, created_at, updated_at";

const RECIPE_COLUMNS: &str = "id, user_id, title, author_name, equipment, coffee_grams, total_water_ml, \
     water_temperature, grind_size, steps, tags, is_public, like_count, created_at, updated_at";

const BREW_LOG_COLUMNS: &str = "id, user_id, recipe_id, bean_id, brew_date, actual_duration, \
     rating, taste_notes, memo, created_at";

/// `Store` over the shared Postgres pool
pub struct PgStore {
    db: Database,
}

impl PgStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

fn decode_kind<T>(row: &PgRow, column: &str) -> Result<Option<T>, sqlx::Error>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: Option<String> = row.try_get(column)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(|e| sqlx::Error::ColumnDecode {
            index: column.to_string(),
            source: Box::new(e),
        }),
    }
}

fn bean_from_row(row: &PgRow) -> Result<Bean, sqlx::Error> {
    Ok(Bean {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        name: row.try_get("name")?,
        roaster_name: row.try_get("roaster_name")?,
        origin: row.try_get("origin")?,
        roast_level: decode_kind::<RoastLevel>(row, "roast_level")?,
        process: row.try_get("process")?,
        roast_date: row.try_get::<Option<NaiveDate>, _>("roast_date")?,
        stock_grams: row.try_get("stock_grams")?,
        flavor_notes: row.try_get("flavor_notes")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn recipe_from_row(row: &PgRow) -> Result<Recipe, sqlx::Error> {
    let equipment = decode_kind::<Equipment>(row, "equipment")?.ok_or_else(|| sqlx::Error::ColumnDecode {
        index: "equipment".to_string(),
        source: "recipe has no equipment".into(),
    })?;
    let Json(steps): Json<Vec<RecipeStep>> = row.try_get("steps")?;

    Ok(Recipe {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        author_name: row.try_get("author_name")?,
        title: row.try_get("title")?,
        equipment,
        coffee_grams: row.try_get("coffee_grams")?,
        total_water_ml: row.try_get("total_water_ml")?,
        water_temperature: row.try_get("water_temperature")?,
        grind_size: decode_kind::<GrindSize>(row, "grind_size")?,
        steps,
        tags: row.try_get("tags")?,
        is_public: row.try_get("is_public")?,
        like_count: row.try_get("like_count")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn brew_log_from_row(row: &PgRow) -> Result<BrewLog, sqlx::Error> {
    let Json(taste_notes): Json<Vec<TasteNote>> = row.try_get("taste_notes")?;

    Ok(BrewLog {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        recipe_id: row.try_get("recipe_id")?,
        bean_id: row.try_get("bean_id")?,
        brew_date: row.try_get::<DateTime<Utc>, _>("brew_date")?,
        actual_duration: row.try_get("actual_duration")?,
        rating: row.try_get("rating")?,
        taste_notes,
        memo: row.try_get("memo")?,
        created_at: row.try_get("created_at")?,
    })
}

fn collect<T>(rows: Vec<PgRow>, map: fn(&PgRow) -> Result<T, sqlx::Error>) -> StoreResult<Vec<T>> {
    rows.iter().map(|row| map(row).map_err(DatabaseError::from)).collect()
}

fn expect_one_affected(affected: u64, what: &str) -> StoreResult<()> {
    if affected == 0 {
        Err(DatabaseError::not_found(what))
    } else {
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn list_beans(&self, owner: Option<&str>) -> StoreResult<Vec<Bean>> {
        let rows = match owner {
            Some(owner) => {
                let sql = format!("SELECT {} FROM beans WHERE user_id = $1 ORDER BY created_at DESC", BEAN_COLUMNS);
                self.db.query(sqlx::query(&sql).bind(owner)).await?
            }
            None => {
                let sql = format!("SELECT {} FROM beans ORDER BY created_at DESC", BEAN_COLUMNS);
                self.db.query(sqlx::query(&sql)).await?
            }
        };
        collect(rows, bean_from_row)
    }

    async fn get_bean(&self, id: Uuid) -> StoreResult<Bean> {
        let sql = format!("SELECT {} FROM beans WHERE id = $1", BEAN_COLUMNS);
        let row = self.db.query_one(sqlx::query(&sql).bind(id), "Bean not found").await?;
        Ok(bean_from_row(&row)?)
    }

    async fn create_bean(&self, owner: &str, input: &BeanInput) -> StoreResult<Bean> {
        let sql = format!(
            "INSERT INTO beans (user_id, name, roaster_name, origin, roast_level, process, roast_date, stock_grams, flavor_notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {}",
            BEAN_COLUMNS
        );
        let query = sqlx::query(&sql)
            .bind(owner)
            .bind(&input.name)
            .bind(&input.roaster_name)
            .bind(&input.origin)
            .bind(input.roast_level.map(|l| l.as_str()))
            .bind(&input.process)
            .bind(input.roast_date)
            .bind(input.stock_grams)
            .bind(&input.flavor_notes);
        let row = self.db.query_one(query, "Bean not created").await?;
        Ok(bean_from_row(&row)?)
    }

    async fn update_bean(&self, id: Uuid, input: &BeanInput) -> StoreResult<Bean> {
        let sql = format!(
            "UPDATE beans SET name = $1, roaster_name = $2, origin = $3, roast_level = $4,
                    process = $5, roast_date = $6, stock_grams = $7, flavor_notes = $8, updated_at = NOW()
             WHERE id = $9
             RETURNING {}",
            BEAN_COLUMNS
        );
        let query = sqlx::query(&sql)
            .bind(&input.name)
            .bind(&input.roaster_name)
            .bind(&input.origin)
            .bind(input.roast_level.map(|l| l.as_str()))
            .bind(&input.process)
            .bind(input.roast_date)
            .bind(input.stock_grams)
            .bind(&input.flavor_notes)
            .bind(id);
        let row = self.db.query_one(query, "Bean not found").await?;
        Ok(bean_from_row(&row)?)
    }

    async fn delete_bean(&self, id: Uuid) -> StoreResult<()> {
        let affected = self.db.exec(sqlx::query("DELETE FROM beans WHERE id = $1").bind(id)).await?;
        expect_one_affected(affected, "Bean not found")
    }

    async fn list_recipes(&self, viewer: Option<&str>) -> StoreResult<Vec<Recipe>> {
        let rows = match viewer {
            Some(viewer) => {
                let sql = format!(
                    "SELECT {} FROM recipes WHERE user_id = $1 OR is_public = true ORDER BY created_at DESC",
                    RECIPE_COLUMNS
                );
                self.db.query(sqlx::query(&sql).bind(viewer)).await?
            }
            None => {
                let sql = format!("SELECT {} FROM recipes ORDER BY created_at DESC", RECIPE_COLUMNS);
                self.db.query(sqlx::query(&sql)).await?
            }
        };
        collect(rows, recipe_from_row)
    }

    async fn list_public_recipes(&self) -> StoreResult<Vec<Recipe>> {
        let sql = format!(
            "SELECT {} FROM recipes WHERE is_public = true ORDER BY like_count DESC, created_at DESC",
            RECIPE_COLUMNS
        );
        let rows = self.db.query(sqlx::query(&sql)).await?;
        collect(rows, recipe_from_row)
    }

    async fn get_recipe(&self, id: Uuid) -> StoreResult<Recipe> {
        let sql = format!("SELECT {} FROM recipes WHERE id = $1", RECIPE_COLUMNS);
        let row = self.db.query_one(sqlx::query(&sql).bind(id), "Recipe not found").await?;
        Ok(recipe_from_row(&row)?)
    }

    async fn create_recipe(&self, owner: &str, input: &RecipeInput) -> StoreResult<Recipe> {
        let sql = format!(
            "INSERT INTO recipes (user_id, title, author_name, equipment, coffee_grams, total_water_ml,
                                  water_temperature, grind_size, steps, tags, is_public)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {}",
            RECIPE_COLUMNS
        );
        let query = sqlx::query(&sql)
            .bind(owner)
            .bind(&input.title)
            .bind(&input.author_name)
            .bind(input.equipment.as_str())
            .bind(input.coffee_grams)
            .bind(input.total_water_ml)
            .bind(input.water_temperature)
            .bind(input.grind_size.map(|g| g.as_str()))
            .bind(Json(&input.steps))
            .bind(&input.tags)
            .bind(input.is_public);
        let row = self.db.query_one(query, "Recipe not created").await?;
        Ok(recipe_from_row(&row)?)
    }

    async fn update_recipe(&self, id: Uuid, input: &RecipeInput) -> StoreResult<Recipe> {
        let sql = format!(
            "UPDATE recipes SET title = $1, author_name = $2, equipment = $3, coffee_grams = $4,
                    total_water_ml = $5, water_temperature = $6, grind_size = $7, steps = $8,
                    tags = $9, is_public = $10, updated_at = NOW()
             WHERE id = $11
             RETURNING {}",
            RECIPE_COLUMNS
        );
        let query = sqlx::query(&sql)
            .bind(&input.title)
            .bind(&input.author_name)
            .bind(input.equipment.as_str())
            .bind(input.coffee_grams)
            .bind(input.total_water_ml)
            .bind(input.water_temperature)
            .bind(input.grind_size.map(|g| g.as_str()))
            .bind(Json(&input.steps))
            .bind(&input.tags)
            .bind(input.is_public)
            .bind(id);
        let row = self.db.query_one(query, "Recipe not found").await?;
        Ok(recipe_from_row(&row)?)
    }

    async fn delete_recipe(&self, id: Uuid) -> StoreResult<()> {
        let affected = self.db.exec(sqlx::query("DELETE FROM recipes WHERE id = $1").bind(id)).await?;
        expect_one_affected(affected, "Recipe not found")
    }

    async fn like_recipe(&self, id: Uuid, user: &str) -> StoreResult<LikeStatus> {
        let mut tx = self.db.begin().await?;

        // Row lock serializes concurrent likes on the same recipe.
        let exists = sqlx::query("SELECT 1 FROM recipes WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(DatabaseError::not_found("Recipe not found"));
        }

        let inserted = sqlx::query(
            "INSERT INTO recipe_likes (recipe_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(id)
        .bind(user)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let like_count: i32 = if inserted > 0 {
            sqlx::query_scalar::<_, i32>(
                "UPDATE recipes SET like_count = like_count + 1 WHERE id = $1 RETURNING like_count",
            )
            .bind(id)
            .fetch_one(&mut *tx)
            .await?
        } else {
            sqlx::query_scalar::<_, i32>("SELECT like_count FROM recipes WHERE id = $1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?
        };

        tx.commit().await?;
        Ok(LikeStatus {
            recipe_id: id,
            liked: true,
            like_count,
        })
    }

    async fn unlike_recipe(&self, id: Uuid, user: &str) -> StoreResult<LikeStatus> {
        let mut tx = self.db.begin().await?;

        let exists = sqlx::query("SELECT 1 FROM recipes WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(DatabaseError::not_found("Recipe not found"));
        }

        let removed = sqlx::query("DELETE FROM recipe_likes WHERE recipe_id = $1 AND user_id = $2")
            .bind(id)
            .bind(user)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let like_count: i32 = if removed > 0 {
            sqlx::query_scalar::<_, i32>(
                "UPDATE recipes SET like_count = GREATEST(like_count - 1, 0) WHERE id = $1 RETURNING like_count",
            )
            .bind(id)
            .fetch_one(&mut *tx)
            .await?
        } else {
            sqlx::query_scalar::<_, i32>("SELECT like_count FROM recipes WHERE id = $1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?
        };

        tx.commit().await?;
        Ok(LikeStatus {
            recipe_id: id,
            liked: false,
            like_count,
        })
    }

    async fn like_status(&self, id: Uuid, user: &str) -> StoreResult<LikeStatus> {
        let row = self
            .db
            .query_one(
                sqlx::query(
                    "SELECT r.like_count,
                            EXISTS (SELECT 1 FROM recipe_likes l WHERE l.recipe_id = r.id AND l.user_id = $2) AS liked
                     FROM recipes r WHERE r.id = $1",
                )
                .bind(id)
                .bind(user),
                "Recipe not found",
            )
            .await?;
        Ok(LikeStatus {
            recipe_id: id,
            liked: row.try_get("liked")?,
            like_count: row.try_get("like_count")?,
        })
    }

    async fn list_brew_logs(&self, owner: Option<&str>) -> StoreResult<Vec<BrewLog>> {
        let rows = match owner {
            Some(owner) => {
                let sql = format!(
                    "SELECT {} FROM brew_logs WHERE user_id = $1 ORDER BY brew_date DESC, created_at DESC",
                    BREW_LOG_COLUMNS
                );
                self.db.query(sqlx::query(&sql).bind(owner)).await?
            }
            None => {
                let sql = format!(
                    "SELECT {} FROM brew_logs ORDER BY brew_date DESC, created_at DESC",
                    BREW_LOG_COLUMNS
                );
                self.db.query(sqlx::query(&sql)).await?
            }
        };
        collect(rows, brew_log_from_row)
    }

    async fn get_brew_log(&self, id: Uuid) -> StoreResult<BrewLog> {
        let sql = format!("SELECT {} FROM brew_logs WHERE id = $1", BREW_LOG_COLUMNS);
        let row = self.db.query_one(sqlx::query(&sql).bind(id), "Brew log not found").await?;
        Ok(brew_log_from_row(&row)?)
    }

    async fn create_brew_log(&self, owner: &str, input: &BrewLogInput) -> StoreResult<BrewLog> {
        // Every early return drops `tx`, which rolls the insert back.
        let mut tx = self.db.begin().await?;

        let sql = format!(
            "INSERT INTO brew_logs (user_id, recipe_id, bean_id, brew_date, actual_duration, rating, taste_notes, memo)
             VALUES ($1, $2, $3, COALESCE($4, NOW()), $5, $6, $7, $8)
             RETURNING {}",
            BREW_LOG_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(owner)
            .bind(input.recipe_id)
            .bind(input.bean_id)
            .bind(input.brew_date)
            .bind(input.actual_duration)
            .bind(input.rating)
            .bind(Json(&input.taste_notes))
            .bind(&input.memo)
            .fetch_one(&mut *tx)
            .await?;
        let log = brew_log_from_row(&row)?;

        if let Some((recipe_id, bean_id)) = input.stock_pairing() {
            let coffee_grams: Option<f64> =
                sqlx::query_scalar::<_, f64>("SELECT coffee_grams FROM recipes WHERE id = $1")
                    .bind(recipe_id)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(|e| DatabaseError::QueryError(format!("Failed to fetch recipe: {}", e)))?;

            match coffee_grams {
                Some(grams) => {
                    sqlx::query(
                        "UPDATE beans
                         SET stock_grams = GREATEST(stock_grams - $1, 0)::integer,
                             updated_at = NOW()
                         WHERE id = $2",
                    )
                    .bind(grams)
                    .bind(bean_id)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| DatabaseError::QueryError(format!("Failed to update bean stock: {}", e)))?;
                }
                None => {
                    tracing::debug!(%recipe_id, "recipe not found, skipping stock adjustment");
                }
            }
        }

        tx.commit()
            .await
            .map_err(|e| DatabaseError::QueryError(format!("Failed to commit transaction: {}", e)))?;
        Ok(log)
    }

    async fn update_brew_log(&self, id: Uuid, input: &BrewLogInput) -> StoreResult<BrewLog> {
        let sql = format!(
            "UPDATE brew_logs SET recipe_id = $1, bean_id = $2, brew_date = COALESCE($3, brew_date),
                    actual_duration = $4, rating = $5, taste_notes = $6, memo = $7
             WHERE id = $8
             RETURNING {}",
            BREW_LOG_COLUMNS
        );
        let query = sqlx::query(&sql)
            .bind(input.recipe_id)
            .bind(input.bean_id)
            .bind(input.brew_date)
            .bind(input.actual_duration)
            .bind(input.rating)
            .bind(Json(&input.taste_notes))
            .bind(&input.memo)
            .bind(id);
        let row = self.db.query_one(query, "Brew log not found").await?;
        Ok(brew_log_from_row(&row)?)
    }

    async fn delete_brew_log(&self, id: Uuid) -> StoreResult<()> {
        let affected = self.db.exec(sqlx::query("DELETE FROM brew_logs WHERE id = $1").bind(id)).await?;
        expect_one_affected(affected, "Brew log not found")
    }
}
