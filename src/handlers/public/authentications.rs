use axum::extract::State;
use serde_json::{json, Value};

use crate::handlers::Payload;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// POST /authentications - exchange credentials for an access token
pub async fn authentications_post(State(state): State<AppState>, Payload(payload): Payload) -> ApiResult<Value> {
    let access_token = state.authentications().login(&payload).await?;

    Ok(ApiResponse::created(json!({ "accessToken": access_token })).with_message("Authentication added"))
}
