use axum::extract::{multipart::MultipartRejection, Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode};
use serde_json::{json, Map, Value};

use crate::auth::BearerToken;
use crate::database::models::Product;
use crate::error::ApiError;
use crate::handlers::{parse_id, Payload};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::ImageUpload;
use crate::state::AppState;

/// Multipart field carrying the image bytes
const IMAGE_FIELD: &str = "data";

/// POST /products - add a product owned by the caller
pub async fn products_post(
    State(state): State<AppState>,
    bearer: BearerToken,
    Payload(payload): Payload,
) -> ApiResult<Value> {
    let product = state.products().create(&bearer, &payload).await?;

    Ok(ApiResponse::created(json!({ "productId": product.id })).with_message("Product added"))
}

/// PUT /products/:id - partial update, owner only
pub async fn product_put(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(id): Path<String>,
    Payload(payload): Payload,
) -> ApiResult<Product> {
    let id = parse_id(&id, "Product")?;
    let product = state.products().update(&bearer, id, &payload).await?;

    Ok(ApiResponse::success(product).with_message("Product updated"))
}

/// DELETE /products/:id - owner only
pub async fn product_delete(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id = parse_id(&id, "Product")?;
    state.products().delete(&bearer, id).await?;

    Ok(ApiResponse::success(()).with_message("Product deleted"))
}

/// POST /products/:id/image - attach an image, owner only
pub async fn product_image_post(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Value> {
    let id = parse_id(&id, "Product")?;
    let mut multipart = multipart.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

    let upload = read_image_field(&mut multipart).await?;
    let product = state.products().upload_image(&bearer, id, upload).await?;

    Ok(ApiResponse::created(json!({ "imageUrl": product.image_url })).with_message("Image uploaded"))
}

async fn read_image_field(multipart: &mut Multipart) -> Result<ImageUpload, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let headers = headers_to_json(field.headers());
        let bytes = field.bytes().await.map_err(multipart_error)?;
        return Ok(ImageUpload {
            headers,
            bytes: bytes.to_vec(),
        });
    }

    Err(ApiError::bad_request(format!("\"{}\" is required", IMAGE_FIELD)))
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large(err.body_text())
    } else {
        ApiError::bad_request(err.body_text())
    }
}

/// Part headers as a JSON object; names are already lowercase
fn headers_to_json(headers: &HeaderMap) -> Value {
    let map: Map<String, Value> = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), Value::String(v.to_string())))
        })
        .collect();
    Value::Object(map)
}
