use axum::extract::State;
use serde_json::{json, Value};

use crate::handlers::Payload;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// POST /users - register an account
pub async fn users_post(State(state): State<AppState>, Payload(payload): Payload) -> ApiResult<Value> {
    let user = state.users().register(&payload).await?;

    Ok(ApiResponse::created(json!({ "userId": user.id })).with_message("User added"))
}
