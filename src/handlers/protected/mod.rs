// handlers/protected/mod.rs - Endpoints that act on behalf of a caller
//
// Every handler here extracts the raw `BearerToken`; the service verifies it
// after the payload has been validated.

pub mod carts;
pub mod products;
pub mod transactions;

pub use carts::{cart_get, cart_item_delete, cart_items_post, carts_post};
pub use products::{product_delete, product_image_post, product_put, products_post};
pub use transactions::{transaction_get, transactions_get, transactions_post};
