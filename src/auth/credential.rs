use jsonwebtoken::TokenData;
use serde::Serialize;
use uuid::Uuid;

use super::{Claims, TokenManager};
use crate::services::ServiceError;

/// Bearer token as found on the request, before verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BearerToken {
    Missing,
    Malformed(&'static str),
    Present(String),
}

/// Caller identity derived from a verified token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Credential {
    pub id: Uuid,
}

impl Credential {
    /// The artifact has already passed signature and expiry checks
    pub fn from_artifact(artifact: &TokenData<Claims>) -> Self {
        Self {
            id: artifact.claims.id,
        }
    }
}

impl TokenManager {
    pub fn authenticate(&self, bearer: &BearerToken) -> Result<Credential, ServiceError> {
        let token = match bearer {
            BearerToken::Present(token) => token,
            BearerToken::Missing => {
                return Err(ServiceError::Unauthenticated("Missing authentication".to_string()))
            }
            BearerToken::Malformed(reason) => return Err(ServiceError::Unauthenticated(reason.to_string())),
        };

        let artifact = self.verify(token).map_err(|e| {
            tracing::debug!("token rejected: {}", e);
            ServiceError::Unauthenticated("Invalid token".to_string())
        })?;

        Ok(Credential::from_artifact(&artifact))
    }
}
