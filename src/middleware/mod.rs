pub mod auth;
pub mod response;

pub use auth::extract_bearer_from_headers;
pub use response::{ApiResponse, ApiResult};
