// handlers/mod.rs - Public and protected HTTP handlers
//
// Handlers only extract raw request input (bearer token, path ids, JSON
// payload) and hand it to a service, which runs validation, authentication,
// ownership checks and persistence in that order.

pub mod protected; // Bearer token required (verified inside the services)
pub mod public; // No authentication

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde_json::Value;
use uuid::Uuid;

use crate::error::ApiError;

/// Untyped JSON body; malformed JSON is reported in the failure envelope
#[derive(Debug)]
pub struct Payload(pub Value);

#[async_trait]
impl<S> FromRequest<S> for Payload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Ids that are not UUIDs cannot name an existing resource
pub fn parse_id(raw: &str, resource: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found(format!("{} not found", resource)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn malformed_id_is_not_found() {
        let err = parse_id("product-123", "Product").unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "Product not found");
    }
}
