// app.rs - Route table and global middleware

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::error::ApiError;
use crate::handlers::{protected, public};
use crate::services::IMAGE_URL_PREFIX;
use crate::state::AppState;

/// Multipart framing allowance on top of the image size limit
const MULTIPART_OVERHEAD: usize = 16 * 1024;

pub fn router(state: AppState) -> Router {
    let images = ServeDir::new(state.storage().images_dir());
    let cors = cors_layer(&state.config().security);

    Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .merge(account_routes())
        .merge(product_routes(state.storage().max_bytes()))
        .merge(cart_routes())
        .merge(transaction_routes())
        .nest_service(IMAGE_URL_PREFIX, images)
        .fallback(route_not_found)
        // Global middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(public::users_post))
        .route("/authentications", post(public::authentications_post))
}

fn product_routes(max_image_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/products", get(public::products_get).post(protected::products_post))
        .route(
            "/products/:id",
            get(public::product_get)
                .put(protected::product_put)
                .delete(protected::product_delete),
        )
        .route(
            "/products/:id/image",
            post(protected::product_image_post).layer(DefaultBodyLimit::max(max_image_bytes + MULTIPART_OVERHEAD)),
        )
}

fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/carts", post(protected::carts_post))
        .route("/carts/:id", get(protected::cart_get))
        .route("/carts/:id/items", post(protected::cart_items_post))
        .route("/carts/:id/items/:productId", delete(protected::cart_item_delete))
}

fn transaction_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/transactions",
            post(protected::transactions_post).get(protected::transactions_get),
        )
        .route("/transactions/:id", get(protected::transaction_get))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
}

async fn route_not_found() -> ApiError {
    ApiError::not_found("Route not found")
}
