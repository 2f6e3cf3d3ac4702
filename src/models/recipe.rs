use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::kinds::{blank_as_none, Equipment, GrindSize};
use super::{blank_to_none, ValidationError};

/// One step of a recipe. `order` is caller supplied and kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeStep {
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub time_seconds: i32,
    #[serde(default)]
    pub water_ml: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: Uuid,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    pub title: String,
    pub equipment: Equipment,
    pub coffee_grams: f64,
    pub total_water_ml: i32,
    pub water_temperature: i32,
    pub grind_size: Option<GrindSize>,
    pub steps: Vec<RecipeStep>,
    pub tags: Vec<String>,
    pub is_public: bool,
    pub like_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /recipes` and `PUT /recipes/:id`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateRecipeRequest {
    pub title: String,
    pub author_name: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub equipment: Option<Equipment>,
    pub coffee_grams: f64,
    pub total_water_ml: i32,
    pub water_temperature: i32,
    #[serde(deserialize_with = "blank_as_none")]
    pub grind_size: Option<GrindSize>,
    pub steps: Vec<RecipeStep>,
    pub tags: Vec<String>,
    pub is_public: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecipeInput {
    pub title: String,
    pub author_name: Option<String>,
    pub equipment: Equipment,
    pub coffee_grams: f64,
    pub total_water_ml: i32,
    pub water_temperature: i32,
    pub grind_size: Option<GrindSize>,
    pub steps: Vec<RecipeStep>,
    pub tags: Vec<String>,
    pub is_public: bool,
}

impl CreateRecipeRequest {
    pub fn validate(self) -> Result<RecipeInput, ValidationError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(ValidationError::MissingRequiredField("title"));
        }
        let equipment = self
            .equipment
            .ok_or(ValidationError::MissingRequiredField("equipment"))?;
        if !self.coffee_grams.is_finite() || self.coffee_grams <= 0.0 {
            return Err(ValidationError::invalid("coffeeGrams", "must be greater than 0"));
        }
        if self.total_water_ml <= 0 {
            return Err(ValidationError::invalid("totalWaterMl", "must be greater than 0"));
        }

        Ok(RecipeInput {
            title,
            author_name: blank_to_none(self.author_name),
            equipment,
            coffee_grams: self.coffee_grams,
            total_water_ml: self.total_water_ml,
            water_temperature: self.water_temperature,
            grind_size: self.grind_size,
            steps: self.steps,
            tags: self.tags,
            is_public: self.is_public,
        })
    }
}

/// Result of the like endpoints for one (recipe, caller) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeStatus {
    pub recipe_id: Uuid,
    pub liked: bool,
    pub like_count: i32,
}
