use axum::extract::{Path, State};
use serde_json::{json, Value};

use crate::auth::BearerToken;
use crate::database::models::CartDetail;
use crate::handlers::{parse_id, Payload};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// POST /carts - open (or reuse) the caller's cart
pub async fn carts_post(State(state): State<AppState>, bearer: BearerToken) -> ApiResult<Value> {
    let cart = state.carts().open(&bearer).await?;

    Ok(ApiResponse::created(json!({ "cartId": cart.id })).with_message("Cart ready"))
}

/// GET /carts/:id - cart with its lines and total
pub async fn cart_get(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(id): Path<String>,
) -> ApiResult<CartDetail> {
    let id = parse_id(&id, "Cart")?;
    let cart = state.carts().get(&bearer, id).await?;

    Ok(ApiResponse::success(cart))
}

/// POST /carts/:id/items - add a product, merging quantities
pub async fn cart_items_post(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(id): Path<String>,
    Payload(payload): Payload,
) -> ApiResult<Value> {
    let id = parse_id(&id, "Cart")?;
    let item = state.carts().add_item(&bearer, id, &payload).await?;

    Ok(ApiResponse::created(json!({
        "productId": item.product_id,
        "quantity": item.quantity,
    }))
    .with_message("Item added to cart"))
}

/// DELETE /carts/:id/items/:productId
pub async fn cart_item_delete(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path((id, product_id)): Path<(String, String)>,
) -> ApiResult<()> {
    let id = parse_id(&id, "Cart")?;
    let product_id = parse_id(&product_id, "Cart item")?;
    state.carts().remove_item(&bearer, id, product_id).await?;

    Ok(ApiResponse::success(()).with_message("Item removed from cart"))
}
