use std::convert::Infallible;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use crate::auth::BearerToken;

/// Read the bearer token from the request; verification happens in the service
#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(extract_bearer_from_headers(&parts.headers))
    }
}

/// Extract JWT token from Authorization header
pub fn extract_bearer_from_headers(headers: &HeaderMap) -> BearerToken {
    let Some(auth_header) = headers.get(AUTHORIZATION) else {
        return BearerToken::Missing;
    };

    let Ok(auth_str) = auth_header.to_str() else {
        return BearerToken::Malformed("Invalid Authorization header format");
    };

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if token.trim().is_empty() => BearerToken::Malformed("Empty JWT token"),
        Some(token) => BearerToken::Present(token.trim().to_string()),
        None => BearerToken::Malformed("Authorization header must use Bearer token format"),
    }
}
