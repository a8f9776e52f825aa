//! Caller credentials are not checked here; the bearer token is handed on
//! to the school API, which decides.

use async_trait::async_trait;
use axum::http::{request::Parts, HeaderMap};
use axum::extract::FromRequestParts;

use crate::error::AppError;

/// Bearer token of the incoming request, if any.
#[derive(Debug, Clone, Default)]
pub struct UpstreamAuth(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for UpstreamAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(UpstreamAuth(extract_bearer_token(&parts.headers)))
    }
}

pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth = headers.get("Authorization")?.to_str().ok()?;
    let token = auth.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}
