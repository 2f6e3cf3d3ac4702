use std::convert::Infallible;

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::models::ANONYMOUS_USER_ID;

/// Identity of the caller as far as the bearer token could tell
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Caller {
    pub user_id: Option<String>,
}

impl Caller {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }

    /// Scope for list queries; `None` means global visibility
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Owner recorded on new rows, falling back to the placeholder identity
    pub fn owner_id(&self) -> &str {
        self.user_id().unwrap_or(ANONYMOUS_USER_ID)
    }
}

/// Claims extractor middleware: decodes the bearer token when it can and never rejects
pub async fn claims_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let authorization = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let caller = Caller {
        user_id: state.claims.identify(authorization),
    };

    if let Some(user_id) = caller.user_id() {
        tracing::debug!(user_id, "request authenticated");
    }
    request.extensions_mut().insert(caller);

    next.run(request).await
}

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Caller>().cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_callers_own_rows_as_placeholder() {
        assert_eq!(Caller::anonymous().user_id(), None);
        assert_eq!(Caller::anonymous().owner_id(), ANONYMOUS_USER_ID);
        assert_eq!(Caller::user("u-1").owner_id(), "u-1");
    }

    #[tokio::test]
    async fn extractor_defaults_to_anonymous() {
        let (mut parts, _) = axum::http::Request::new(()).into_parts();
        let caller = Caller::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(caller, Caller::anonymous());

        parts.extensions.insert(Caller::user("u-9"));
        let caller = Caller::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(caller.user_id(), Some("u-9"));
    }
}
