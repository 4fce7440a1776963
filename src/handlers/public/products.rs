use axum::extract::{Path, State};

use crate::database::models::Product;
use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /products - list the catalog
pub async fn products_get(State(state): State<AppState>) -> ApiResult<Vec<Product>> {
    let products = state.products().list().await?;
    Ok(ApiResponse::success(products))
}

/// GET /products/:id - show a single product
pub async fn product_get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Product> {
    let id = parse_id(&id, "Product")?;
    let product = state.products().get(id).await?;
    Ok(ApiResponse::success(product))
}
