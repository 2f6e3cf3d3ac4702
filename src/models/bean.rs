use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::kinds::{blank_as_none, RoastLevel};
use super::ValidationError;

/// A purchased batch of beans with stock tracked in grams
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bean {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub roaster_name: String,
    pub origin: String,
    pub roast_level: Option<RoastLevel>,
    pub process: String,
    pub roast_date: Option<NaiveDate>,
    pub stock_grams: i32,
    pub flavor_notes: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /beans` and `PUT /beans/:id`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateBeanRequest {
    pub name: String,
    pub roaster_name: String,
    pub origin: String,
    #[serde(deserialize_with = "blank_as_none")]
    pub roast_level: Option<RoastLevel>,
    pub process: String,
    pub roast_date: Option<String>,
    pub stock_grams: i32,
    pub flavor_notes: Vec<String>,
}

/// Validated bean fields, ready for a store
#[derive(Debug, Clone, PartialEq)]
pub struct BeanInput {
    pub name: String,
    pub roaster_name: String,
    pub origin: String,
    pub roast_level: Option<RoastLevel>,
    pub process: String,
    pub roast_date: Option<NaiveDate>,
    pub stock_grams: i32,
    pub flavor_notes: Vec<String>,
}

impl CreateBeanRequest {
    pub fn validate(self) -> Result<BeanInput, ValidationError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::MissingRequiredField("name"));
        }
        if self.stock_grams < 0 {
            return Err(ValidationError::invalid("stockGrams", "must not be negative"));
        }

        Ok(BeanInput {
            name,
            roaster_name: self.roaster_name,
            origin: self.origin,
            roast_level: self.roast_level,
            process: self.process,
            roast_date: self.roast_date.as_deref().and_then(parse_roast_date),
            stock_grams: self.stock_grams,
            flavor_notes: self.flavor_notes,
        })
    }
}

/// `YYYY-MM-DD`; anything else is stored as no date
fn parse_roast_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}
