use axum::extract::{Path, State};
use serde_json::{json, Value};

use crate::auth::BearerToken;
use crate::database::models::Transaction;
use crate::handlers::{parse_id, Payload};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// POST /transactions - check out a cart
pub async fn transactions_post(
    State(state): State<AppState>,
    bearer: BearerToken,
    Payload(payload): Payload,
) -> ApiResult<Value> {
    let transaction = state.transactions().checkout(&bearer, &payload).await?;

    Ok(ApiResponse::created(json!({
        "transactionId": transaction.id,
        "total": transaction.total,
    }))
    .with_message("Transaction completed"))
}

/// GET /transactions - the caller's transactions
pub async fn transactions_get(State(state): State<AppState>, bearer: BearerToken) -> ApiResult<Vec<Transaction>> {
    let transactions = state.transactions().list(&bearer).await?;
    Ok(ApiResponse::success(transactions))
}

/// GET /transactions/:id
pub async fn transaction_get(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(id): Path<String>,
) -> ApiResult<Transaction> {
    let id = parse_id(&id, "Transaction")?;
    let transaction = state.transactions().get(&bearer, id).await?;
    Ok(ApiResponse::success(transaction))
}
