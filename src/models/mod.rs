pub mod bean;
pub mod brew_log;
pub mod kinds;
pub mod recipe;

use std::collections::HashMap;

pub use bean::{Bean, BeanInput, CreateBeanRequest};
pub use brew_log::{BrewLog, BrewLogInput, CreateBrewLogRequest, TasteNote};
pub use kinds::{Equipment, GrindSize, RoastLevel, TasteAspect, UnknownVariant};
pub use recipe::{CreateRecipeRequest, LikeStatus, Recipe, RecipeInput, RecipeStep};

/// Owner recorded for rows created without a caller identity
pub const ANONYMOUS_USER_ID: &str = "00000000-0000-0000-0000-000000000000";

/// Request-shape validation failure, keyed by the offending JSON field
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingRequiredField(&'static str),

    #[error("{field} {message}")]
    InvalidField { field: &'static str, message: String },
}

impl ValidationError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        ValidationError::InvalidField {
            field,
            message: message.into(),
        }
    }

    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingRequiredField(field) => field,
            ValidationError::InvalidField { field, .. } => field,
        }
    }

    pub fn field_errors(&self) -> HashMap<String, String> {
        let message = match self {
            ValidationError::MissingRequiredField(_) => "This field is required".to_string(),
            ValidationError::InvalidField { message, .. } => message.clone(),
        };
        HashMap::from([(self.field().to_string(), message)])
    }
}

/// Inclusive 1-5 scale shared by ratings and taste scores
pub(crate) fn check_score(field: &'static str, value: i32) -> Result<(), ValidationError> {
    if (1..=5).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::invalid(field, format!("must be between 1 and 5, got {}", value)))
    }
}

pub(crate) fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
