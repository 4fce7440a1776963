// handlers/public/mod.rs - Endpoints that need no bearer token

pub mod authentications;
pub mod products;
pub mod root;
pub mod users;

pub use authentications::authentications_post;
pub use products::{product_get, products_get};
pub use root::{health, root};
pub use users::users_post;
