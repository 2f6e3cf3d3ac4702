pub mod auth;
pub mod cors;
pub mod json;

pub use auth::{claims_middleware, Caller};
pub use cors::cors_middleware;
pub use json::ValidJson;
