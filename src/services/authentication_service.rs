use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use super::error::{ServiceError, ServiceResult};
use crate::auth::password::verify_password;
use crate::auth::TokenManager;
use crate::database::{DatabaseError, UserRepository};
use crate::validator::schemas::AUTHENTICATION_PAYLOAD;

#[derive(Debug, Deserialize)]
struct Login {
    username: String,
    password: String,
}

/// Exchanges username and password for an access token
#[derive(Clone)]
pub struct AuthenticationService {
    users: Arc<dyn UserRepository>,
    tokens: TokenManager,
}

impl AuthenticationService {
    pub fn new(users: Arc<dyn UserRepository>, tokens: TokenManager) -> Self {
        Self { users, tokens }
    }

    pub async fn login(&self, payload: &Value) -> ServiceResult<String> {
        let login: Login = AUTHENTICATION_PAYLOAD.validate_into(payload)?;

        // Unknown user and wrong password are indistinguishable to the caller
        let user = match self.users.find_user_by_username(&login.username).await {
            Ok(user) => user,
            Err(DatabaseError::NotFound(_)) => return Err(invalid_credentials(&login.username)),
            Err(other) => return Err(other.into()),
        };
        if !verify_password(&login.password, &user.password_hash) {
            return Err(invalid_credentials(&login.username));
        }

        let token = self
            .tokens
            .issue(user.id)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        tracing::debug!(user_id = %user.id, "issued access token");
        Ok(token)
    }
}

fn invalid_credentials(username: &str) -> ServiceError {
    tracing::warn!("failed login for {}", username);
    ServiceError::Unauthenticated("The credentials you provided are incorrect".to_string())
}
