use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::kinds::{blank_as_none, TasteAspect};
use super::{blank_to_none, check_score, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TasteNote {
    pub aspect: TasteAspect,
    pub score: i32,
}

/// One actual brewing event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrewLog {
    pub id: Uuid,
    pub user_id: String,
    pub recipe_id: Option<Uuid>,
    pub bean_id: Option<Uuid>,
    pub brew_date: DateTime<Utc>,
    pub actual_duration: i32,
    pub rating: i32,
    pub taste_notes: Vec<TasteNote>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /brew-logs` and `PUT /brew-logs/:id`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateBrewLogRequest {
    #[serde(deserialize_with = "blank_as_none")]
    pub recipe_id: Option<Uuid>,
    #[serde(deserialize_with = "blank_as_none")]
    pub bean_id: Option<Uuid>,
    pub brew_date: Option<DateTime<Utc>>,
    pub actual_duration: i32,
    pub rating: Option<i32>,
    pub taste_notes: Vec<TasteNote>,
    pub memo: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BrewLogInput {
    pub recipe_id: Option<Uuid>,
    pub bean_id: Option<Uuid>,
    pub brew_date: Option<DateTime<Utc>>,
    pub actual_duration: i32,
    pub rating: i32,
    pub taste_notes: Vec<TasteNote>,
    pub memo: Option<String>,
}

impl BrewLogInput {
    /// Stock is only touched when both sides of the pairing are known
    pub fn stock_pairing(&self) -> Option<(Uuid, Uuid)> {
        self.recipe_id.zip(self.bean_id)
    }
}

impl CreateBrewLogRequest {
    pub fn validate(self) -> Result<BrewLogInput, ValidationError> {
        let rating = self.rating.ok_or(ValidationError::MissingRequiredField("rating"))?;
        check_score("rating", rating)?;
        for note in &self.taste_notes {
            check_score("tasteNotes", note.score)?;
        }
        if self.actual_duration < 0 {
            return Err(ValidationError::invalid("actualDuration", "must not be negative"));
        }

        Ok(BrewLogInput {
            recipe_id: self.recipe_id,
            bean_id: self.bean_id,
            brew_date: self.brew_date,
            actual_duration: self.actual_duration,
            rating,
            taste_notes: self.taste_notes,
            memo: blank_to_none(self.memo),
        })
    }
}
