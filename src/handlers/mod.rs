// handlers/mod.rs - resource handlers mounted under /api/v1, plus /health
pub mod beans;
pub mod brew_logs;
pub mod health;
pub mod recipes;

use uuid::Uuid;

use crate::error::ApiError;

pub use health::health;

/// Path ids that don't parse as UUIDs can't match any row
pub(crate) fn parse_id(raw: &str, not_found: &'static str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found(not_found))
}
