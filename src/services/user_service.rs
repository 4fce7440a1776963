use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use super::error::{ServiceError, ServiceResult};
use crate::auth::password::hash_password;
use crate::database::models::{NewUser, User};
use crate::database::UserRepository;
use crate::validator::schemas::USER_PAYLOAD;

#[derive(Debug, Deserialize)]
struct Registration {
    username: String,
    password: String,
    fullname: String,
}

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Register a new account; duplicate usernames surface as `Conflict`
    pub async fn register(&self, payload: &Value) -> ServiceResult<User> {
        let registration: Registration = USER_PAYLOAD.validate_into(payload)?;

        let password_hash =
            hash_password(&registration.password).map_err(|e| ServiceError::Internal(e.to_string()))?;

        let user = self
            .users
            .insert_user(NewUser {
                username: registration.username,
                password_hash,
                fullname: registration.fullname,
            })
            .await?;

        tracing::info!(user_id = %user.id, "registered user {}", user.username);
        Ok(user)
    }
}
